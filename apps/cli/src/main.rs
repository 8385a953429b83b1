use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{JobsApi, JobsClient, DEFAULT_SERVER_URL};
use shared::{
    domain::{FilterSelection, JobId, JobPayload, JobPosting, SortOrder, DEFAULT_JOB_TYPE},
    tags::{join_tags, split_tags},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jobs", about = "Command-line client for the job listing service")]
struct Cli {
    #[arg(long, env = "JOBS_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List postings, newest first unless `--oldest-first` is given.
    List {
        #[arg(long, default_value = "")]
        job_type: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        tag: String,
        #[arg(long)]
        oldest_first: bool,
    },
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = DEFAULT_JOB_TYPE)]
        job_type: String,
        /// Comma-separated.
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Change the given fields and keep the rest.
    Update {
        id: i64,
        #[command(flatten)]
        edits: UpdateArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug, Default)]
struct UpdateArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    job_type: Option<String>,
    #[arg(long)]
    tags: Option<String>,
}

impl UpdateArgs {
    fn merge_into(self, current: &JobPosting) -> JobPayload {
        let mut payload = current.payload();
        if let Some(title) = self.title {
            payload.title = title;
        }
        if let Some(company) = self.company {
            payload.company = company;
        }
        if let Some(location) = self.location {
            payload.location = location;
        }
        if let Some(job_type) = self.job_type {
            payload.job_type = job_type;
        }
        if let Some(tags) = self.tags {
            payload.tags = split_tags(&tags);
        }
        payload
    }
}

fn render(job: &JobPosting) -> String {
    format!(
        "#{} {}\n    {} | {} | {}\n    posted {}  tags: {}",
        job.id,
        job.title,
        job.company,
        job.location,
        job.job_type,
        job.posting_date.format("%Y-%m-%d"),
        if job.tags.is_empty() {
            "-".to_string()
        } else {
            join_tags(&job.tags)
        },
    )
}

fn ensure_complete(payload: &JobPayload) -> Result<()> {
    let missing = payload.missing_required_fields();
    if !missing.is_empty() {
        bail!("missing required field(s): {}", missing.join(", "));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let cli = Cli::parse();
    let client = JobsClient::new(&cli.server_url)?;
    debug!(base_url = %client.base_url(), "using listing service");

    match cli.command {
        Command::List {
            job_type,
            location,
            tag,
            oldest_first,
        } => {
            let filter = FilterSelection {
                job_type,
                location,
                tag,
                sort: if oldest_first {
                    SortOrder::OldestFirst
                } else {
                    SortOrder::NewestFirst
                },
            };
            let jobs = client.list_jobs(&filter).await?;
            if jobs.is_empty() {
                println!("no postings");
            }
            for job in &jobs {
                println!("{}", render(job));
            }
        }
        Command::Show { id } => {
            let job = client.get_job(JobId(id)).await?;
            println!("{}", render(&job));
        }
        Command::Create {
            title,
            company,
            location,
            job_type,
            tags,
        } => {
            let payload = JobPayload {
                title,
                company,
                location,
                job_type,
                tags: split_tags(&tags),
            };
            ensure_complete(&payload)?;
            client.create_job(&payload).await?;
            println!("created \"{}\"", payload.title);
        }
        Command::Update { id, edits } => {
            let current = client.get_job(JobId(id)).await?;
            let payload = edits.merge_into(&current);
            ensure_complete(&payload)?;
            client.update_job(current.id, &payload).await?;
            println!("updated #{id}");
        }
        Command::Delete { id } => {
            client.delete_job(JobId(id)).await?;
            println!("deleted #{id}");
        }
    }

    Ok(())
}
