use log::debug;

use crate::Stats;

/// Receives progress at every digit-length boundary of a search.
pub trait Reporter {
    fn report_on(&mut self, ndigits: usize, stats: &Stats);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report_on(&mut self, ndigits: usize, stats: &Stats) {
        (**self).report_on(ndigits, stats)
    }
}

pub struct NullReporter;

impl Reporter for NullReporter {
    fn report_on(&mut self, _: usize, _: &Stats) {}
}

pub struct LogReporter;

impl Reporter for LogReporter {
    fn report_on(&mut self, ndigits: usize, stats: &Stats) {
        debug!(
            "{} digits done: {} candidates, {} total, throughput: {}/s",
            ndigits,
            stats.count,
            stats.total,
            human_format::Formatter::new().format(stats.throughput())
        );
    }
}
