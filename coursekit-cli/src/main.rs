//! CourseKit CLI - terminal front end for the course-content core
//!
//! Thin wiring of config + credentials + client. Renders the content
//! tree and exercises the mutation operations and the upload pipeline;
//! all actual state lives in the gateway and the client library.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use coursekit_client::{
    ApiGateway, CourseEditor, CourseStore, CredentialProvider, SessionFile, StaticCredentials,
    UploadSource,
};
use coursekit_common::api::{LessonPatch, SectionPatch};

/// Command-line arguments for coursekit
#[derive(Parser, Debug)]
#[command(name = "coursekit")]
#[command(about = "Course content management client")]
#[command(version)]
struct Args {
    /// Gateway base URL
    #[arg(long, env = "COURSEKIT_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Bearer token (overrides the persisted session file)
    #[arg(long, env = "COURSEKIT_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the course tree
    Courses,
    /// Create a course, optionally with a banner image
    CreateCourse {
        title: String,
        description: String,
        #[arg(long, default_value = "general")]
        category: String,
        #[arg(long)]
        banner: Option<PathBuf>,
    },
    /// Add a section to a course
    AddSection {
        course_id: Uuid,
        title: String,
        description: String,
    },
    /// Edit a section (only the given fields are sent)
    EditSection {
        course_id: Uuid,
        section_id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a section and its lessons
    DeleteSection { course_id: Uuid, section_id: Uuid },
    /// Add a lesson, optionally uploading an asset first
    AddLesson {
        section_id: Uuid,
        course_id: Uuid,
        title: String,
        description: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Edit a lesson (only the given fields are sent)
    EditLesson {
        lesson_id: Uuid,
        course_id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a lesson
    DeleteLesson {
        lesson_id: Uuid,
        course_id: Uuid,
        section_id: Uuid,
    },
    /// Publish a course (blocked while it has no sections)
    Publish { course_id: Uuid },
    /// Resolve an object key to a time-limited viewable link
    Link { file_key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coursekit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = coursekit_common::config::resolve(args.gateway_url.as_deref())
        .context("Failed to resolve configuration")?;
    info!("Gateway: {}", config.gateway_url);

    let credentials: Box<dyn CredentialProvider> = match &args.token {
        Some(token) => Box::new(StaticCredentials::new(token.clone())),
        None => {
            let path = config
                .session_file
                .clone()
                .context("No token given and no session file configured")?;
            Box::new(SessionFile::new(path))
        }
    };

    let gateway = Arc::new(
        ApiGateway::new(
            &config.gateway_url,
            Duration::from_secs(config.request_timeout_secs),
            credentials,
        )
        .context("Failed to initialize gateway client")?,
    );
    let store = Arc::new(CourseStore::new());
    let editor = CourseEditor::new(Arc::clone(&gateway), Arc::clone(&store))
        .context("Failed to initialize editor")?;

    match args.command {
        Command::Courses => {
            store.load(&gateway).await?;
            render_tree(&store);
        }
        Command::CreateCourse {
            title,
            description,
            category,
            banner,
        } => {
            let banner_source = banner.map(read_upload_source).transpose()?;
            let course = editor
                .create_course(&title, &description, &category, banner_source.as_ref())
                .await?;
            println!("Created course {}", course.id);
        }
        Command::AddSection {
            course_id,
            title,
            description,
        } => {
            editor.add_section(course_id, &title, &description).await?;
            println!("Section added");
        }
        Command::EditSection {
            course_id,
            section_id,
            title,
            description,
        } => {
            editor
                .edit_section(course_id, section_id, SectionPatch { title, description })
                .await?;
            println!("Section updated");
        }
        Command::DeleteSection {
            course_id,
            section_id,
        } => {
            editor.delete_section(course_id, section_id).await?;
            println!("Section deleted");
        }
        Command::AddLesson {
            section_id,
            course_id,
            title,
            description,
            file,
        } => {
            let source = file.map(read_upload_source).transpose()?;
            let lesson = editor
                .add_lesson(section_id, course_id, &title, &description, source.as_ref())
                .await?;
            println!("Created lesson {}", lesson.id);
        }
        Command::EditLesson {
            lesson_id,
            course_id,
            title,
            description,
        } => {
            editor
                .edit_lesson(lesson_id, course_id, LessonPatch { title, description })
                .await?;
            println!("Lesson updated");
        }
        Command::DeleteLesson {
            lesson_id,
            course_id,
            section_id,
        } => {
            editor.delete_lesson(lesson_id, course_id, section_id).await?;
            println!("Lesson deleted");
        }
        Command::Publish { course_id } => {
            store.load(&gateway).await?;
            editor.publish_course(course_id).await?;
            println!("Course published");
        }
        Command::Link { file_key } => {
            let url = editor.uploader().viewable_link(&file_key).await?;
            println!("{}", url);
        }
    }

    Ok(())
}

/// Read a local file into an upload source, sniffing the content type
/// from the leading bytes
fn read_upload_source(path: PathBuf) -> Result<UploadSource> {
    let bytes = std::fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?;
    if bytes.is_empty() {
        bail!("Refusing to upload empty file: {:?}", path);
    }
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("Not a file path: {:?}", path))?;
    let content_type = infer::get(&bytes)
        .map(|t| t.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(UploadSource::new(filename, content_type, bytes))
}

fn render_tree(store: &CourseStore) {
    let courses = store.get();
    if courses.is_empty() {
        println!("No courses");
        return;
    }
    for course in courses.iter() {
        let published = if course.published { " [published]" } else { "" };
        println!("{} {}{}", course.id, course.title, published);
        for section in &course.sections {
            println!("  {} {} ({} lessons)", section.id, section.title, section.lessons.len());
        }
    }
}
