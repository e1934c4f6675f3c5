/// Receives human readable status lines from scans and cleanups.
///
/// Reports are delivered synchronously on the thread doing the work,
/// so implementations must not block for long.
pub trait ProgressSink {
    fn report(&mut self, status: &str);
}

/// Sink that drops every report.
pub struct VoidProgress;

impl ProgressSink for VoidProgress {
    fn report(&mut self, _status: &str) {}
}

/// Adapts a closure into a [`ProgressSink`].
pub struct FnProgress<F>(pub F);

impl<F: FnMut(&str)> ProgressSink for FnProgress<F> {
    fn report(&mut self, status: &str) {
        (self.0)(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        let mut sink = FnProgress(|status: &str| seen.push(status.to_string()));
        {
            let sink: &mut dyn ProgressSink = &mut sink;
            sink.report("one");
            sink.report("two");
        }
        assert_eq!(seen, vec!["one", "two"]);
    }
}
