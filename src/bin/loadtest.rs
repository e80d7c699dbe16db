use clap::Parser;
use disque::{Client, Error};
use std::sync::{atomic, Arc};
use std::time::Duration;

lazy_static::lazy_static! {
    static ref QUEUE_NAME: String = format!("loadtest_{}", std::process::id());
}

#[derive(Parser)]
#[command(version, about = "Loadtest for the Rust Disque client.", long_about = None)]
struct Cli {
    #[arg(short, long, default_value_t = 30_000)]
    jobs_count: usize,

    #[arg(short, long, default_value_t = 10)]
    tasks_count: usize,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    log::info!(
        "Running a loadtest with the following settings: jobs_count={}, tasks_count={}. Queue name will be {}",
        cli.jobs_count,
        cli.tasks_count,
        QUEUE_NAME.as_str()
    );

    let jobs_sent = Arc::new(atomic::AtomicUsize::new(0));
    let jobs_fetched = Arc::new(atomic::AtomicUsize::new(0));

    let start = std::time::Instant::now();

    let mut set = tokio::task::JoinSet::new();
    let tasks_count = cli.tasks_count;
    let _: Vec<_> = (0..tasks_count)
        .map(|_| {
            let jobs_sent = jobs_sent.clone();
            let jobs_fetched = jobs_fetched.clone();
            set.spawn(async move {
                let c = Client::connect().await?;
                for idx in 0..cli.jobs_count {
                    if idx % 2 == 0 {
                        let _id = c
                            .send_data(QUEUE_NAME.as_str(), b"payload", Duration::from_secs(1))
                            .await?;
                        if jobs_sent.fetch_add(1, atomic::Ordering::SeqCst) >= cli.jobs_count {
                            return Ok(idx);
                        }
                    } else {
                        let maybe_job = c.fetch_job(QUEUE_NAME.as_str()).await?;
                        if let Some(job) = maybe_job {
                            c.fast_ack_job(&job).await?;
                        }
                        if jobs_fetched.fetch_add(1, atomic::Ordering::SeqCst) >= cli.jobs_count {
                            return Ok(idx);
                        }
                    }
                }
                Ok::<usize, Error>(cli.jobs_count)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(tasks_count);
    while let Some(res) = set.join_next().await {
        results.push(res.unwrap());
    }

    let time_elapsed = start.elapsed();
    let seconds_elapsed = (time_elapsed.as_secs() * 1_000_000_000
        + time_elapsed.subsec_nanos() as u64) as f64
        / 1_000_000_000.0;

    log::info!(
        "Sent {} jobs and consumed {} jobs in {:.2} seconds, rate: {} jobs per second. Results: {:?}",
        jobs_sent.load(atomic::Ordering::SeqCst),
        jobs_fetched.load(atomic::Ordering::SeqCst),
        seconds_elapsed,
        cli.jobs_count as f64 / seconds_elapsed,
        results,
    );
}
