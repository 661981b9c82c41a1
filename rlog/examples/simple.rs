//! Logs a simulated training run.
//!
//! Run `tensorboard --logdir results` to see the results of a run with
//! `--tensorboard`.
use anyhow::Result;
use chrono::Local;
use clap::Parser;
use rlog::{
    metric::{MetricConfig, MetricKind, ValueKind},
    record::Record,
    LoggerConfig,
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of environment steps
    #[arg(short, long, default_value_t = 300_000)]
    steps: i64,

    /// Steps between two summaries
    #[arg(short, long, default_value_t = 10_000)]
    interval: i64,

    /// Write Tensorboard event files
    #[arg(short, long, default_value_t = false)]
    tensorboard: bool,

    /// Directory of the results
    #[arg(long, default_value = "./results")]
    results: String,
}

/// An agent getting better with each step: episodes get longer.
fn reward_following_policy(step: i64, knee: f64) -> (f64, bool) {
    if step % 500 == 0 {
        return (1.0, true);
    }
    let done = fastrand::f64() > gauss(step as f64 / knee, 0.5).tanh();
    (1.0, done)
}

fn gauss(mean: f64, std: f64) -> f64 {
    let u1 = 1.0 - fastrand::f64();
    let u2 = fastrand::f64();
    mean + std * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn metrics() -> Vec<MetricConfig> {
    vec![
        // counts episodes
        MetricConfig::new(MetricKind::Sum, "ep_cnt")
            .inputs(["done"])
            .resettable(false),
        // mean reward per episode
        MetricConfig::new(MetricKind::Average, "R/ep").inputs(["reward", "done"]),
        MetricConfig::new(MetricKind::Ema, "ewm R/ep")
            .inputs(["reward", "done"])
            .beta(0.6),
        // mean reward per step
        MetricConfig::new(MetricKind::Average, "R/step").inputs(["reward", "1"]),
        MetricConfig::new(MetricKind::Average, "clip R/ep").inputs(["clip(reward)", "done"]),
        MetricConfig::new(MetricKind::Fps, "train_fps").inputs(["frame_no"]),
        MetricConfig::new(MetricKind::Value, "gaussians")
            .inputs(["sample"])
            .value_kind(ValueKind::Histogram),
    ]
}

fn main() -> Result<()> {
    let args = Args::parse();
    fastrand::seed(42);

    let path = format!("{}/{}", args.results, Local::now().format("%Y%b%d-%H%M%S"));
    let config = LoggerConfig::new("dqn")
        .path(&path)
        .tensorboard(args.tensorboard)
        .metrics(metrics());
    let mut rlog = rlog::init(&config)?;
    rlog.info("Logging application level stuff.")?;
    rlog.info(format!("Log artifacts will be saved in {}", path))?;

    // not shown on the console at the default level
    for step in 0..5 {
        rlog.trace_record(&Record::empty().with("step", step).with("aux_loss", 7.23 - step as f64))?;
    }

    let mut mean = 0.0;
    for step in 1..=args.steps {
        let (reward, done) = reward_following_policy(step, 40_000.0);
        let sample = gauss(mean, 0.1);

        rlog.put(
            &Record::empty()
                .with("reward", reward)
                .with("done", done)
                .with("frame_no", 1)
                .with("sample", sample),
        )?;

        if step % args.interval == 0 {
            rlog.trace_and_log(step, true)?;
            mean += 1.0;
        }
    }

    rlog.trace("But we can continue tracing stuff manually...")?;
    rlog.trace_record(
        &Record::empty()
            .with("step", args.steps)
            .with("aux_loss", 0.23)
            .with("finished", Local::now()),
    )?;
    rlog.info("Done.")?;

    Ok(())
}
