use serde::Serialize;

/// One progress notification handed to the caller-supplied callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub message: String,
    pub percent: u8,
}

/// Wraps the caller's callback and enforces the contract that percent values
/// form a non-decreasing sequence within one analysis.
pub struct ProgressTracker<'a> {
    callback: Box<dyn FnMut(ProgressEvent) + Send + 'a>,
    last: u8,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(callback: impl FnMut(ProgressEvent) + Send + 'a) -> Self {
        Self {
            callback: Box::new(callback),
            last: 0,
        }
    }

    pub fn report(&mut self, message: &str, percent: u8) {
        let percent = percent.clamp(self.last, 100);
        self.last = percent;
        (self.callback)(ProgressEvent {
            message: message.to_string(),
            percent,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_never_decreases() {
        let mut seen = Vec::new();
        let mut tracker = ProgressTracker::new(|event: ProgressEvent| seen.push(event.percent));
        tracker.report("a", 20);
        tracker.report("b", 10);
        tracker.report("c", 75);
        tracker.report("d", 100);
        drop(tracker);
        assert_eq!(seen, vec![20, 20, 75, 100]);
    }

    #[test]
    fn test_percent_capped_at_hundred() {
        let mut seen = Vec::new();
        let mut tracker = ProgressTracker::new(|event: ProgressEvent| seen.push(event.percent));
        tracker.report("a", 150);
        drop(tracker);
        assert_eq!(seen, vec![100]);
    }
}
