// src/bin/sim.rs
//
// Entry point: pick a scenario, run it to the horizon, print a summary.
//
//   sim [scenario] [seed] [--config FILE] [--save PREFIX]
//
// Scenarios: taker | twap | maker | signal. A run is fully determined by
// the config, the seed, and the scenario.

use std::process;

use microsim::{
    BlockExecution, Config, FIRST_AGENT_OWNER, InventoryMaker, ManualTaker, Side, SignalTaker,
    SimError, SimRng, Simulator, Strategy, SymmetricMaker, TwapExecution,
    utils::logging,
};

const INITIAL_CASH: f64 = 100_000.0;
const PARENT_SIZE: u64 = 600;
const PARENT_START: f64 = 1800.0;

struct Args {
    scenario: String,
    seed: Option<u64>,
    config_path: Option<String>,
    save_prefix: Option<String>,
}

fn usage() -> ! {
    eprintln!("usage: sim [taker|twap|maker|signal] [seed] [--config FILE] [--save PREFIX]");
    process::exit(2);
}

fn parse_args() -> Args {
    let mut args = Args {
        scenario: "taker".to_string(),
        seed: None,
        config_path: None,
        save_prefix: None,
    };

    let mut positional = 0;
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => match iter.next() {
                Some(path) => args.config_path = Some(path),
                None => usage(),
            },
            "--save" => match iter.next() {
                Some(prefix) => args.save_prefix = Some(prefix),
                None => usage(),
            },
            "--help" | "-h" => usage(),
            _ if positional == 0 => {
                args.scenario = arg;
                positional += 1;
            }
            _ if positional == 1 => match arg.parse() {
                Ok(seed) => {
                    args.seed = Some(seed);
                    positional += 1;
                }
                Err(_) => usage(),
            },
            _ => usage(),
        }
    }
    args
}

fn build_agents(
    scenario: &str,
    config: &Config,
    rng: &mut SimRng,
) -> Vec<Box<dyn Strategy>> {
    match scenario {
        "taker" => {
            let mut taker = ManualTaker::new(
                "block_taker",
                FIRST_AGENT_OWNER,
                INITIAL_CASH,
                0,
                Box::new(BlockExecution),
            );
            taker.schedule_order(PARENT_START, PARENT_SIZE, Side::Buy, rng);
            vec![Box::new(taker)]
        }
        "twap" => {
            let twap = match TwapExecution::from_params(&config.strategy.taker.twap) {
                Ok(twap) => twap,
                Err(e) => {
                    eprintln!("invalid twap parameters: {e}");
                    process::exit(1);
                }
            };
            let mut taker = ManualTaker::new(
                "twap_taker",
                FIRST_AGENT_OWNER,
                INITIAL_CASH,
                0,
                Box::new(twap),
            );
            taker.schedule_order(PARENT_START, PARENT_SIZE, Side::Buy, rng);
            vec![Box::new(taker)]
        }
        "maker" => {
            let symmetric = SymmetricMaker::new(
                "symmetric_maker",
                FIRST_AGENT_OWNER,
                INITIAL_CASH,
                0,
                &config.strategy.market_maker,
                &config.sim,
            );
            let inventory = InventoryMaker::new(
                "inventory_maker",
                FIRST_AGENT_OWNER + 1,
                INITIAL_CASH,
                0,
                10,
                &config.strategy.market_maker,
                &config.sim,
            );
            vec![Box::new(symmetric), Box::new(inventory)]
        }
        "signal" => {
            let momentum = SignalTaker::momentum(
                "momentum_taker",
                FIRST_AGENT_OWNER,
                INITIAL_CASH,
                Box::new(BlockExecution),
                10,
                80.0,
                0.5,
            );
            let imbalance = SignalTaker::imbalance(
                "imbalance_taker",
                FIRST_AGENT_OWNER + 1,
                INITIAL_CASH,
                Box::new(BlockExecution),
                10,
                0.4,
            );
            vec![Box::new(momentum), Box::new(imbalance)]
        }
        _ => usage(),
    }
}

fn print_table(title: &str, rows: &[(&'static str, String)]) {
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    println!("\n{title}");
    println!("{}", "=".repeat(title.len()));
    for (key, value) in rows {
        println!("  {key:<width$}  {value}");
    }
}

fn run() -> Result<(), SimError> {
    let args = parse_args();

    let mut config = match &args.config_path {
        Some(path) => Config::load_json(path)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config.sim.random_seed = Some(seed);
    }

    logging::init(&config.sim)?;

    let mut rng = SimRng::new(config.sim.random_seed);
    let agents = build_agents(&args.scenario, &config, &mut rng);

    let mut simulator = Simulator::new(config, rng, agents)?;
    simulator.populate_initial_book(16, 3);
    simulator.run();

    print_table("Book", &simulator.metrics().summary());
    for agent in simulator.agents() {
        print_table(agent.name(), &agent.metrics().summary());
    }

    if let Some(prefix) = &args.save_prefix {
        simulator.save_metrics(format!("{prefix}-metrics.csv"))?;
        simulator.save_order_book(format!("{prefix}-orderbook.csv"))?;
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
