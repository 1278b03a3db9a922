use clap::{Parser, Subcommand};

mod inspect;
mod play;
mod predict;
mod train;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Replay the draw archive against a player population in a TUI
    Play(play::PlayArg),
    /// Train a model with the evolutionary loop and save it
    Train(train::TrainArg),
    /// Predict a ball set from the latest draw in the archive
    Predict(predict::PredictArg),
    /// Summarize a draw archive
    Inspect(inspect::InspectArg),
}

pub fn run() -> anyhow::Result<()> {
    match CommandArgs::parse().mode {
        Mode::Play(arg) => play::run(&arg),
        Mode::Train(arg) => train::run(&arg),
        Mode::Predict(arg) => predict::run(&arg),
        Mode::Inspect(arg) => inspect::run(&arg),
    }
}
