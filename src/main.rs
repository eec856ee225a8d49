//! mtm-guarantee CLI
//!
//! Run the guarantee risk engine from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Generate synthetic market data
//! mtm-guarantee generate --months 120 --output market.json
//!
//! # Run with default assumptions
//! mtm-guarantee run --market market.json
//!
//! # Override assumptions and print JSON
//! mtm-guarantee run --market market.json --scenario scenario.json --format json
//! ```

use mtm_guarantee::config::ScenarioConfig;
use mtm_guarantee::core::currency::{default_currencies, CurrencyCode};
use mtm_guarantee::core::market::MarketData;
use mtm_guarantee::core::portfolio::PortfolioWeights;
use mtm_guarantee::pipeline::GuaranteeModel;
use mtm_guarantee::simulation::synthetic::{generate_market, SyntheticMarketConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"mtm-guarantee: risk and capital for guarantees on EM FX mark-to-market losses

USAGE:
    mtm-guarantee <COMMAND> [OPTIONS]

COMMANDS:
    run         Simulate payouts and size capital, liquidity and the waterfall
    generate    Generate synthetic market data (for testing)
    help        Show this message

OPTIONS (run):
    --market <FILE>       Path to JSON market data (required)
    --scenario <FILE>     Path to JSON scenario overrides
    --currencies <LIST>   Comma-separated currency codes (default: UGX,TZS,KES,BWP,BDT,LKR,VND,IDR)
    --weights <LIST>      Comma-separated CCY=WEIGHT pairs (default: equal)
    --format <FORMAT>     Output format: text (default) or json
    --fast                Use 2,000 paths

OPTIONS (generate):
    --months <N>          Monthly observations (default: 120)
    --currencies <LIST>   Comma-separated currency codes
    --seed <N>            Random seed (default: 1)
    --output <FILE>       Write to file instead of stdout

Set RUST_LOG=info (or debug) for progress logging.

EXAMPLES:
    mtm-guarantee generate --months 96 --output market.json
    mtm-guarantee run --market market.json --fast
    mtm-guarantee run --market market.json --weights KES=2,UGX=1 --currencies KES,UGX"#
    );
}

fn value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    args.get(i).map(String::as_str).unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, what);
        process::exit(1);
    })
}

fn parse_currencies(list: &str) -> Vec<CurrencyCode> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(CurrencyCode::new)
        .collect()
}

fn parse_weights(list: &str) -> PortfolioWeights {
    let pairs = list.split(',').map(|pair| {
        let (ccy, w) = pair.split_once('=').unwrap_or_else(|| {
            eprintln!("Invalid weight '{}': expected CCY=WEIGHT", pair);
            process::exit(1);
        });
        let w: f64 = w.trim().parse().unwrap_or_else(|e| {
            eprintln!("Invalid weight '{}': {}", pair, e);
            process::exit(1);
        });
        (CurrencyCode::new(ccy.trim()), w)
    });
    PortfolioWeights::normalized(pairs)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing '{}': {}", path, e);
        process::exit(1);
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    })
}

fn cmd_run(args: &[String]) {
    let mut market_path = None;
    let mut scenario_path = None;
    let mut currencies = default_currencies();
    let mut weights = None;
    let mut format = "text".to_string();
    let mut fast = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--market" => {
                i += 1;
                market_path = Some(value(args, i, "--market", "a file path").to_string());
            }
            "--scenario" => {
                i += 1;
                scenario_path = Some(value(args, i, "--scenario", "a file path").to_string());
            }
            "--currencies" => {
                i += 1;
                currencies = parse_currencies(value(args, i, "--currencies", "a comma-separated list"));
            }
            "--weights" => {
                i += 1;
                weights = Some(parse_weights(value(args, i, "--weights", "CCY=WEIGHT pairs")));
            }
            "--format" => {
                i += 1;
                format = value(args, i, "--format", "'text' or 'json'").to_string();
            }
            "--fast" => fast = true,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let market_path = market_path.unwrap_or_else(|| {
        eprintln!("Error: --market <FILE> is required");
        process::exit(1);
    });

    let market: MarketData = read_json(&market_path);
    let mut config: ScenarioConfig = match scenario_path {
        Some(path) => read_json(&path),
        None => ScenarioConfig::default(),
    };
    if fast {
        config.paths = ScenarioConfig::fast().paths;
    }
    let weights = weights.unwrap_or_else(|| PortfolioWeights::equal(&currencies));

    let model = GuaranteeModel::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid scenario: {}", e);
        process::exit(1);
    });
    let result = model.run(&market, &currencies, &weights).unwrap_or_else(|e| {
        eprintln!("Run failed: {}", e);
        process::exit(1);
    });

    if format == "json" {
        println!("{}", to_json(&result));
    } else {
        println!("{}", result);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = SyntheticMarketConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--months" => {
                i += 1;
                config.months = value(args, i, "--months", "a number").parse().unwrap_or_else(|_| {
                    eprintln!("--months requires a number");
                    process::exit(1);
                });
            }
            "--currencies" => {
                i += 1;
                config.currencies = parse_currencies(value(args, i, "--currencies", "a comma-separated list"));
            }
            "--seed" => {
                i += 1;
                config.seed = value(args, i, "--seed", "a number").parse().unwrap_or_else(|_| {
                    eprintln!("--seed requires a number");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(value(args, i, "--output", "a file path").to_string());
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let market = generate_market(&config);
    let json = to_json(&market);

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} months across {} currencies → {}",
            config.months,
            config.currencies.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "run" => cmd_run(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
