use clap::Parser;
use env_logger::Env;
use splitflow_driver::session::Args;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    args.run()
}
