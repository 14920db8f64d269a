use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    pages::{
        topic_detail::QuizStart, CourseDetailPage, DashboardPage, LoginPage, ProfilePage,
        SignupForm, SignupPage, TopicDetailPage,
    },
    HttpTransport, LearningClient, PageContext, Route, SessionStore,
};
use shared::domain::{AssessmentId, AttemptId, CourseId, Gender, TopicId};
use storage::Storage;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod quiz;
mod render;

use config::{load_settings, normalize_store_url};

#[derive(Parser, Debug)]
#[command(name = "learner", about = "Terminal client for the learning platform")]
struct Cli {
    #[arg(long, default_value = "learner.toml")]
    config: PathBuf,
    /// Overrides the configured GraphQL endpoint.
    #[arg(long)]
    graphql_url: Option<String>,
    #[arg(long)]
    store_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone_number: String,
        #[arg(long, default_value = "OTHER")]
        gender: String,
    },
    Logout,
    Dashboard,
    Profile,
    ProfileUpdate {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone_number: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    Course {
        course_id: String,
    },
    Enroll {
        course_id: String,
    },
    Topic {
        course_id: String,
        topic_id: String,
    },
    Complete {
        course_id: String,
        topic_id: String,
    },
    Quiz {
        #[command(subcommand)]
        action: QuizCommand,
    },
    /// Shows the page for an app path such as `/course/c1/topic/t1`.
    Open {
        path: String,
    },
}

#[derive(Subcommand, Debug)]
enum QuizCommand {
    Start {
        course_id: String,
        topic_id: String,
    },
    Resume {
        assessment_id: String,
        attempt_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(url) = cli.graphql_url {
        settings.graphql_url = url;
    }
    if let Some(url) = cli.store_url {
        settings.store_url = normalize_store_url(&url);
    }
    let endpoint = settings.endpoint()?;
    debug!(%endpoint, store_url = %settings.store_url, "settings resolved");

    let store = Storage::new(&settings.store_url)
        .await
        .with_context(|| format!("failed to open local state at '{}'", settings.store_url))?;
    let transport = HttpTransport::new(endpoint.as_str(), settings.request_timeout())?;
    let ctx = PageContext::new(
        LearningClient::new(Arc::new(transport)),
        SessionStore::new(Arc::new(store)),
    );
    if let Some(token) = ctx.session.load().await?.and_then(|session| session.token) {
        ctx.client.set_auth_token(Some(token)).await;
    }

    run(&ctx, cli.command).await
}

async fn run(ctx: &PageContext, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let outcome = LoginPage::new(ctx.clone()).submit(&email, &password).await;
            print!("{}", render::outcome(&outcome));
        }
        Command::Signup {
            name,
            username,
            password,
            email,
            phone_number,
            gender,
        } => {
            let form = SignupForm {
                name,
                username,
                password,
                gender: parse_gender(&gender)?,
                email,
                phone_number,
            };
            let outcome = SignupPage::new(ctx.clone()).submit(form).await;
            print!("{}", render::outcome(&outcome));
        }
        Command::Logout => {
            let outcome = DashboardPage::new(ctx.clone()).logout().await;
            print!("{}", render::outcome(&outcome));
        }
        Command::Dashboard => show(ctx, Route::Dashboard).await?,
        Command::Profile => show(ctx, Route::Profile).await?,
        Command::ProfileUpdate {
            name,
            username,
            email,
            phone_number,
            gender,
            password,
        } => {
            let page = ProfilePage::new(ctx.clone());
            let mut view = match page.load().await {
                Ok(view) => view,
                Err(outcome) => {
                    print!("{}", render::outcome(&outcome));
                    return Ok(());
                }
            };
            view.toggle_edit();
            let form = &mut view.form;
            if let Some(v) = name {
                form.name = v;
            }
            if let Some(v) = username {
                form.username = v;
            }
            if let Some(v) = email {
                form.email = v;
            }
            if let Some(v) = phone_number {
                form.phone_number = v;
            }
            if let Some(v) = gender {
                form.gender = parse_gender(&v)?;
            }
            if let Some(v) = password {
                form.password = v;
            }
            let notice = page.save(&mut view).await;
            println!("{}", render::notice(&notice));
            if !notice.is_error() {
                print!("{}", render::profile(&view));
            }
        }
        Command::Course { course_id } => {
            show(
                ctx,
                Route::Course {
                    course_id: CourseId::new(course_id),
                },
            )
            .await?
        }
        Command::Enroll { course_id } => {
            let outcome = CourseDetailPage::new(ctx.clone(), CourseId::new(course_id))
                .enroll()
                .await;
            print!("{}", render::outcome(&outcome));
        }
        Command::Topic {
            course_id,
            topic_id,
        } => {
            show(
                ctx,
                Route::Topic {
                    course_id: CourseId::new(course_id),
                    topic_id: TopicId::new(topic_id),
                },
            )
            .await?
        }
        Command::Complete {
            course_id,
            topic_id,
        } => {
            let outcome =
                TopicDetailPage::new(ctx.clone(), CourseId::new(course_id), TopicId::new(topic_id))
                    .mark_complete()
                    .await;
            print!("{}", render::outcome(&outcome));
        }
        Command::Quiz {
            action: QuizCommand::Start {
                course_id,
                topic_id,
            },
        } => {
            let page =
                TopicDetailPage::new(ctx.clone(), CourseId::new(course_id), TopicId::new(topic_id));
            match page.start_quiz().await {
                QuizStart::Started(Route::QuizAttempt {
                    assessment_id,
                    attempt_id,
                }) => {
                    info!(%assessment_id, %attempt_id, "starting quiz session");
                    quiz::run(ctx, assessment_id, attempt_id).await?;
                }
                QuizStart::Started(route) => println!("-> {route}"),
                QuizStart::AttemptsExhausted {
                    attempts_limit,
                    attempted,
                } => println!(
                    "All attempts used ({} of {}).",
                    attempted.unwrap_or_default(),
                    attempts_limit.unwrap_or_default()
                ),
                QuizStart::Failed(notice) => println!("{}", render::notice(&notice)),
            }
        }
        Command::Quiz {
            action:
                QuizCommand::Resume {
                    assessment_id,
                    attempt_id,
                },
        } => {
            quiz::run(
                ctx,
                AssessmentId::new(assessment_id),
                AttemptId::new(attempt_id),
            )
            .await?
        }
        Command::Open { path } => {
            let Some(route) = Route::parse(&path) else {
                bail!("unknown path '{path}'");
            };
            show(ctx, route).await?;
        }
    }
    Ok(())
}

/// Loads and prints the page behind `route`.
async fn show(ctx: &PageContext, route: Route) -> Result<()> {
    let rendered = match route {
        Route::Login => "Sign in with `learner login <email> --password <password>`.\n".to_string(),
        Route::Signup => "Create an account with `learner signup --help`.\n".to_string(),
        Route::Dashboard => DashboardPage::new(ctx.clone())
            .load()
            .await
            .map(|view| render::dashboard(&view))
            .unwrap_or_else(|outcome| render::outcome(&outcome)),
        Route::Profile => ProfilePage::new(ctx.clone())
            .load()
            .await
            .map(|view| render::profile(&view))
            .unwrap_or_else(|outcome| render::outcome(&outcome)),
        Route::Course { course_id } => CourseDetailPage::new(ctx.clone(), course_id)
            .load()
            .await
            .map(|view| render::course(&view))
            .unwrap_or_else(|outcome| render::outcome(&outcome)),
        Route::Topic {
            course_id,
            topic_id,
        } => TopicDetailPage::new(ctx.clone(), course_id, topic_id)
            .load()
            .await
            .map(|view| render::topic(&view))
            .unwrap_or_else(|outcome| render::outcome(&outcome)),
        Route::QuizAttempt {
            assessment_id,
            attempt_id,
        } => {
            return quiz::run(ctx, assessment_id, attempt_id).await;
        }
    };
    print!("{rendered}");
    Ok(())
}

fn parse_gender(raw: &str) -> Result<Gender> {
    raw.parse::<Gender>()
        .with_context(|| format!("gender must be MALE, FEMALE or OTHER, got '{raw}'"))
}
