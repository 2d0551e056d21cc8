//! Campus CLI - operator interface over the JSON store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::Level;

use campus_catalog::{BasicCatalog, CourseCatalog, NewCourse};
use campus_core::{Role, Session, User};
use campus_enrollment::{
    AccountAdmin, BasicAccountAdmin, BasicEnrollmentRegistry, EnrollmentRegistry,
};
use campus_progress::{check_access, LedgerTracker, ProgressTracker};
use campus_storage::{JsonStorage, Storage};

#[derive(Parser)]
#[command(name = "campus")]
#[command(about = "E-learning platform core", long_about = None)]
struct Cli {
    /// Storage root directory
    #[arg(long, default_value = ".campus")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a user account
    AddUser {
        /// Display name
        name: String,
        /// Contact email
        email: String,
        /// Create the account with the admin role
        #[arg(long)]
        admin: bool,
    },
    /// List accounts (admin)
    ListUsers {
        /// User id to act as
        #[arg(long = "as")]
        acting_user: String,
    },
    /// Delete an account (admin)
    DeleteUser {
        /// User ID
        id: String,
        /// User id to act as
        #[arg(long = "as")]
        acting_user: String,
    },
    /// Add a course from a JSON spec file (admin)
    AddCourse {
        /// Path to a NewCourse JSON document
        file: PathBuf,
        /// User id to act as
        #[arg(long = "as")]
        acting_user: String,
    },
    /// List courses
    ListCourses,
    /// Show course structure
    ShowCourse {
        /// Course ID
        id: String,
    },
    /// Delete a course (admin)
    DeleteCourse {
        /// Course ID
        id: String,
        /// User id to act as
        #[arg(long = "as")]
        acting_user: String,
    },
    /// Enroll a user in a course
    Enroll {
        /// User ID
        user: String,
        /// Course ID
        course: String,
    },
    /// Show a user's enrolled courses
    Dashboard {
        /// User ID
        user: String,
    },
    /// Mark a lesson completed
    Complete {
        /// User ID
        user: String,
        /// Course ID
        course: String,
        /// Lesson ID
        lesson: String,
    },
    /// Show progress for a (user, course) pair
    Progress {
        /// User ID
        user: String,
        /// Course ID
        course: String,
    },
    /// Check whether a lesson position is unlocked
    Access {
        /// User ID
        user: String,
        /// Course ID
        course: String,
        /// Module index (0-based)
        module_index: usize,
        /// Lesson index (0-based)
        lesson_index: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    let storage = Arc::new(Mutex::new(JsonStorage::new(&cli.root).await?));
    let catalog = BasicCatalog::shared(storage.clone());
    let registry = BasicEnrollmentRegistry::shared(storage.clone());
    let accounts = BasicAccountAdmin::shared(storage.clone());
    let tracker = LedgerTracker::shared(storage.clone());

    match cli.command {
        Commands::AddUser { name, email, admin } => {
            let mut user = User::new(name, email);
            if admin {
                user.role = Role::Admin;
            }
            storage.lock().await.save_user(&user).await?;
            println!("Added user: {} - {} <{}>", user.id, user.name, user.email);
        }
        Commands::ListUsers { acting_user } => {
            let session = session_for(&storage, &acting_user).await?;
            let users = accounts.list_accounts(&session).await?;

            println!("Users ({})", users.len());
            for user in users {
                println!(
                    "  {} | {:?} | {} <{}> | {} course(s)",
                    user.id,
                    user.role,
                    user.name,
                    user.email,
                    user.enrolled_courses.len(),
                );
            }
        }
        Commands::DeleteUser { id, acting_user } => {
            let session = session_for(&storage, &acting_user).await?;
            let user_id = id.parse().map_err(|_| anyhow::anyhow!("Invalid user ID"))?;
            accounts.delete_account(&session, user_id).await?;
            println!("Deleted user: {}", user_id);
        }
        Commands::AddCourse { file, acting_user } => {
            let session = session_for(&storage, &acting_user).await?;
            let spec: NewCourse = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            let course = catalog.create_course(&session, spec).await?;
            println!("Added course: {} - {}", course.id, course.title);
        }
        Commands::ListCourses => {
            let courses = catalog.list_courses().await?;

            println!("Courses ({})", courses.len());
            for course in courses {
                println!(
                    "  {} | {} | {} module(s), {} lesson(s) | {}",
                    course.id,
                    course.title,
                    course.modules.len(),
                    course.total_lessons(),
                    course.duration,
                );
            }
        }
        Commands::ShowCourse { id } => {
            let course_id = id.parse().map_err(|_| anyhow::anyhow!("Invalid course ID"))?;
            let course = catalog.get_course(course_id).await?;

            println!("Course: {}", course.id);
            println!("  Title: {}", course.title);
            println!("  Price: {}", course.price);
            println!("  Duration: {}", course.duration);
            for (mi, module) in course.modules.iter().enumerate() {
                println!("  [{}] {} ({})", mi, module.title, module.id);
                for (li, lesson) in module.lessons.iter().enumerate() {
                    println!(
                        "    [{}.{}] {} ({} min) ({})",
                        mi, li, lesson.title, lesson.duration_minutes, lesson.id
                    );
                }
            }
        }
        Commands::DeleteCourse { id, acting_user } => {
            let session = session_for(&storage, &acting_user).await?;
            let course_id = id.parse().map_err(|_| anyhow::anyhow!("Invalid course ID"))?;
            catalog.delete_course(&session, course_id).await?;
            println!("Deleted course: {}", course_id);
        }
        Commands::Enroll { user, course } => {
            let user_id = user.parse().map_err(|_| anyhow::anyhow!("Invalid user ID"))?;
            let course_id = course
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid course ID"))?;
            let user = registry.enroll(user_id, course_id).await?;
            println!(
                "Enrolled {} ({} course(s) total)",
                user.name,
                user.enrolled_courses.len()
            );
        }
        Commands::Dashboard { user } => {
            let user_id = user.parse().map_err(|_| anyhow::anyhow!("Invalid user ID"))?;
            let courses = registry.enrolled_courses(user_id).await?;

            println!("Enrolled courses ({})", courses.len());
            for course in courses {
                println!("  {} | {}", course.id, course.title);
            }
        }
        Commands::Complete { user, course, lesson } => {
            let user_id = user.parse().map_err(|_| anyhow::anyhow!("Invalid user ID"))?;
            let course_id = course
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid course ID"))?;
            let lesson_id = lesson
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid lesson ID"))?;

            let record = tracker.complete_lesson(user_id, course_id, lesson_id).await?;
            println!(
                "Progress: {}% | {} lesson(s), {} module(s) complete",
                record.progress_percentage,
                record.completed_lessons.len(),
                record.completed_modules.len(),
            );
        }
        Commands::Progress { user, course } => {
            let user_id = user.parse().map_err(|_| anyhow::anyhow!("Invalid user ID"))?;
            let course_id = course
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid course ID"))?;

            let Some(record) = tracker.get_progress(user_id, course_id).await? else {
                println!("No progress recorded");
                return Ok(());
            };

            println!("Progress: {}%", record.progress_percentage);
            println!("  Completed lessons: {}", record.completed_lessons.len());
            println!("  Completed modules: {}", record.completed_modules.len());
            println!("  Last accessed: {}", record.last_accessed);
        }
        Commands::Access {
            user,
            course,
            module_index,
            lesson_index,
        } => {
            let user_id = user.parse().map_err(|_| anyhow::anyhow!("Invalid user ID"))?;
            let course_id = course
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid course ID"))?;

            let course = catalog.get_course(course_id).await?;
            let record = tracker.get_progress(user_id, course_id).await?;

            match check_access(&course, record.as_ref(), module_index, lesson_index) {
                Ok(()) => println!("Accessible"),
                Err(reason) => println!("Locked: {:?}", reason),
            }
        }
    }

    Ok(())
}

async fn session_for(
    storage: &Arc<Mutex<JsonStorage>>,
    user_id: &str,
) -> Result<Session> {
    let id = user_id
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid user ID"))?;
    let user = storage
        .lock()
        .await
        .load_user(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found: {}", id))?;
    Ok(Session::for_user(&user))
}
