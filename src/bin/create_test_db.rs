use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use fintrack::{
    NewTransaction, PasswordHash, TransactionType, ValidatedPassword, create_transaction,
    create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of fintrack.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("test@example.com", password_hash, &conn)?;

    println!("Creating test transactions...");

    let today = OffsetDateTime::now_utc().date();
    let sample_transactions = [
        (45, TransactionType::Income, "salary", 4200.0, None),
        (40, TransactionType::Expense, "rent", 1500.0, None),
        (38, TransactionType::Expense, "groceries", 87.3, Some("weekly shop")),
        (31, TransactionType::Expense, "groceries", 92.1, None),
        (15, TransactionType::Income, "salary", 4200.0, None),
        (10, TransactionType::Expense, "rent", 1500.0, None),
        (7, TransactionType::Expense, "groceries", 78.4, Some("weekly shop")),
        (3, TransactionType::Expense, "eating out", 45.0, Some("birthday dinner")),
        (0, TransactionType::Expense, "groceries", 81.9, None),
    ];

    for (days_ago, transaction_type, category, amount, notes) in sample_transactions {
        create_transaction(
            NewTransaction {
                date: today - Duration::days(days_ago),
                transaction_type,
                category: category.to_owned(),
                amount,
                notes: notes.map(str::to_owned),
            },
            user.id,
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
