use clap::{Parser, Subcommand};
use educa::auth::hash_password;
use educa::model::entity::{
    Course, CourseCreate, Subject, SubjectCreate, UserEntity, UserEntityCreate,
};
use educa::model::{DbConnection, ModelManager};
use educa::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for seeding the course platform DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage subjects
    Subject {
        #[command(subcommand)]
        action: SubjectCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "student")]
        role: String,
    },
}

/// Subject management
#[derive(Subcommand, Debug)]
pub enum SubjectCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        /// Username of the owning instructor
        #[arg(long)]
        owner: String,
        /// Slug of an existing subject
        #[arg(long)]
        subject: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
        #[arg(long, default_value = "")]
        overview: String,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let database_uri =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for educa-cli");
    let db = DbConnection::connect(&database_uri).expect("Unable to connect to the database");
    let mm = ModelManager::new(db);

    match cli.command {
        Commands::User {
            action:
                UserCommands::Add {
                    username,
                    password,
                    role,
                },
        } => {
            let hash = hash_password(&password).expect("Unable to hash password");
            let created = UserEntity::create(
                &mm,
                UserEntityCreate {
                    username,
                    password_hash: hash,
                    role: UserRole::from(role.as_str()),
                },
            )
            .await
            .expect("Unable to create user");
            println!("created user {} ({})", created.username(), created.id());
        }

        Commands::Subject {
            action: SubjectCommands::Add { title, slug },
        } => {
            let created = Subject::create(&mm, SubjectCreate { title, slug })
                .await
                .expect("Unable to create subject");
            println!("created subject {} ({})", created.slug(), created.id());
        }

        Commands::Course {
            action:
                CourseCommands::Add {
                    owner,
                    subject,
                    title,
                    slug,
                    overview,
                },
        } => {
            let owner = UserEntity::find_by_username(&mm, &owner)
                .await
                .expect("Unable to look up owner")
                .expect("No such user");
            let subject = Subject::find_by_slug(&mm, &subject)
                .await
                .expect("Unable to look up subject")
                .expect("No such subject");

            let actor = AuthenticatedUser::new(owner.id(), owner.role());
            let created = Course::create(
                &mm,
                &actor,
                CourseCreate {
                    subject_id: subject.id(),
                    title,
                    slug,
                    overview,
                },
            )
            .await
            .expect("Unable to create course");
            println!("created course {} ({})", created.slug(), created.id());
        }
    }
}
