//! Scheduled jobs for the karma service.

#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};

use karma_common::config::KarmaWeights;
use karma_common::db_util;
use karma_common::validation::RegistrationInput;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    weights: KarmaWeights,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute every student's karma and print each school's leaderboard
    Recompute {
        /// Only process this school
        #[arg(short, long)]
        school: Option<u32>,
    },
    /// Create a superuser account
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
}

fn recompute(conn: &mut db_util::PgConnection, weights: &KarmaWeights, only: Option<u32>) -> Result<()> {
    let schools = db_util::get_all_schools(conn)?;
    if let Some(school_id) = only {
        if !schools.iter().any(|s| s.school_id == school_id) {
            warn!("School #{school_id} does not exist");
            return Ok(());
        }
    }

    for school in schools
        .into_iter()
        .filter(|s| only.is_none_or(|id| id == s.school_id))
    {
        println!("=== SCHOOL #{} {} ===", school.school_id, school.name);

        let students = db_util::get_students_in_school(conn, school.school_id, false)?;
        let mut changed = 0;
        for student in &students {
            let before = db_util::find_karma(conn, student.student_id)?;
            let after = db_util::recompute_karma(conn, weights, student.student_id)?;
            if before.is_none_or(|b| b.score != after.score) {
                changed += 1;
            }
        }
        info!(
            "School #{}: recomputed {} students, {changed} changed",
            school.school_id,
            students.len()
        );

        for entry in db_util::get_leaderboard(conn, school.school_id)? {
            println!("{:>4}. {} ({})", entry.rank, entry.name, entry.score);
        }
        println!();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger from environment variables (RUST_LOG)
    env_logger::init();

    let mut conn = db_util::get_database_connection()?;
    info!("Database connection established.");

    match cli.command {
        None => recompute(&mut conn, &cli.weights, None),
        Some(Command::Recompute { school }) => recompute(&mut conn, &cli.weights, school),
        Some(Command::CreateSuperuser {
            email,
            username,
            first_name,
            last_name,
        }) => {
            let input = RegistrationInput {
                school: String::new(),
                email,
                username,
                first_name,
                last_name,
            };
            let user = db_util::register_superuser(&mut conn, &input)?;
            println!("Created superuser #{} ({})", user.user_id, user.username);
            Ok(())
        }
    }
}
