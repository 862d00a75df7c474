mod command;
mod model;
mod problem;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
