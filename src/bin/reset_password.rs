use std::{error::Error, io, path::Path, process::exit};

use bcrypt::DEFAULT_COST;
use clap::Parser;
use rusqlite::Connection;

use duesbook::{PasswordHash, ValidatedPassword, get_user_by_username, update_password};

/// A utility for changing the password for a registered user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The username of the account whose password should be replaced.
    #[arg(long)]
    username: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let db_path = Path::new(&args.db_path);
    if db_path.extension().is_none_or(|ext| ext.is_empty()) {
        fail("Database path must include a file extension (e.g., 'my_database.db').");
    }
    if !db_path.is_file() {
        fail(format!("File does not exist at {db_path:?}!"));
    }

    let conn = Connection::open(db_path)?;

    let user = match get_user_by_username(&args.username, &conn) {
        Ok(user) => user,
        Err(error) => fail(format!("Could not load user \"{}\": {error}", args.username)),
    };
    println!("Resetting password for {} <{}>", user.username, user.email);

    let Some(password_hash) = prompt_for_new_password() else {
        return Ok(());
    };

    update_password(&user.username, password_hash, &conn)?;
    println!("Password updated successfully!");

    Ok(())
}

/// Prompt for a new password until a valid, confirmed one is entered.
///
/// Returns `None` if stdin is closed, so the tool can be aborted with ctrl+d.
fn prompt_for_new_password() -> Option<PasswordHash> {
    loop {
        println!();

        let password = read_password("Enter a new password: ")?;

        if let Err(error) = ValidatedPassword::new(&password) {
            print_error(error);
            continue;
        }

        let confirmation = read_password("Enter the same password again: ")?;
        if password != confirmation {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::from_raw_password(&password, DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => print_error(format!("Could not hash password: {error}. Try again.")),
        }
    }
}

fn read_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn fail(message: impl ToString) -> ! {
    print_error(message);
    exit(1);
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string());
}
