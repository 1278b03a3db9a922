use std::path::PathBuf;

use chrono::NaiveDate;

use loterix_engine::{BALL_MAX, BALL_MIN, DrawArchive};

use crate::util::load_archive;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// Draw archive CSV
    #[arg(long)]
    csv: PathBuf,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let archive = load_archive(&arg.csv)?;

    let first = archive.draws().first().expect("parse_csv rejects empty archives");
    let last = archive.latest().expect("parse_csv rejects empty archives");
    let (oldest, newest) = date_range(&archive);

    println!("draws: {}", archive.len());
    println!("draw ids: #{} .. #{}", first.id, last.id);
    println!("dates: {oldest} .. {newest}");
    println!();
    println!("ball frequency:");
    for (ball, count) in ball_frequencies(&archive) {
        let share = percentage(count, archive.len());
        println!("  {ball:02}: {count:>6} ({share:.1}% of draws)");
    }

    Ok(())
}

fn date_range(archive: &DrawArchive) -> (NaiveDate, NaiveDate) {
    let mut oldest = archive.draws()[0].date;
    let mut newest = oldest;
    for draw in archive.draws() {
        oldest = oldest.min(draw.date);
        newest = newest.max(draw.date);
    }
    (oldest, newest)
}

fn ball_frequencies(archive: &DrawArchive) -> Vec<(u8, usize)> {
    let mut counts = vec![0usize; usize::from(BALL_MAX) + 1];
    for draw in archive.draws() {
        for &ball in &draw.balls {
            counts[usize::from(ball)] += 1;
        }
    }
    (BALL_MIN..=BALL_MAX)
        .map(|ball| (ball, counts[usize::from(ball)]))
        .collect()
}

#[expect(clippy::cast_precision_loss)]
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}
