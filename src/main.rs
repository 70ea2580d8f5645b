use std::process::ExitCode;
use std::time::Duration;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vsq_rules::dns::Dns;
use vsq_rules::{QueryConfig, ServerQuery};

const USAGE: &str = "usage: vsq-rules <host[:port]> [--timeout SECS] [--json] [--pre-orange-box]";

struct Options {
    target: String,
    config: QueryConfig,
    json: bool,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut target = None;
        let mut config = QueryConfig::default();
        let mut json = false;

        let mut args = args.iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--json" => json = true,
                "--pre-orange-box" => config = config.with_pre_orange_box(true),
                "--timeout" | "-t" => {
                    let secs: f64 = args
                        .next()
                        .and_then(|v| v.parse().ok())
                        .filter(|v: &f64| v.is_finite() && *v > 0.0)
                        .ok_or("--timeout expects a positive number of seconds")?;
                    config = config.with_timeout(Duration::from_secs_f64(secs));
                }
                _ if target.is_none() && !arg.starts_with('-') => target = Some(arg.clone()),
                _ => return Err(format!("unexpected argument: {}", arg)),
            }
        }

        Ok(Self {
            target: target.ok_or("missing server address")?,
            config,
            json,
        })
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match Options::parse(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}\n{}", err, USAGE);
            return ExitCode::from(2);
        }
    };

    let addr = match Dns::new().resolve(&options.target).await {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!("{}: {}", options.target, err);
            return ExitCode::FAILURE;
        }
    };

    let query = match ServerQuery::with_config(addr, options.config).await {
        Ok(query) => query,
        Err(err) => {
            eprintln!("{}: {}", addr, err);
            return ExitCode::FAILURE;
        }
    };

    let info = match query.a2s_rules().await {
        Ok(info) => info,
        Err(err) => {
            tracing::error!("[{}] Rules query failed: {}", addr, err);
            eprintln!("{}: {}", addr, err);
            return ExitCode::FAILURE;
        }
    };

    if options.json {
        match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            }
        }
    } else {
        let mut rules: Vec<_> = info.iter().collect();
        rules.sort_by(|a, b| a.name.cmp(b.name));

        for rule in rules {
            println!("{} = {}", rule.name, rule.value);
        }
        println!("({} of {} rules)", info.len(), info.count());
    }

    ExitCode::SUCCESS
}
