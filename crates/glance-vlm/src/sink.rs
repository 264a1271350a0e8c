use std::sync::mpsc;

/// Receives the formatted prediction string on behalf of the display thread.
///
/// Publishing is fire-and-forget: the inference side never blocks on the
/// display side and never fails the call because of it. This is the only
/// cross-thread hand-off in the system.
pub trait DisplaySink {
    /// Hand one formatted result string to the display side.
    fn publish(&self, text: String);
}

/// A [`DisplaySink`] backed by an mpsc channel drained by the main thread.
pub struct TitleSink {
    sender: mpsc::Sender<String>,
}

impl TitleSink {
    /// Create a sink and the receiver end for the displaying thread.
    ///
    /// # Examples
    ///
    /// ```
    /// use glance_vlm::{DisplaySink, TitleSink};
    ///
    /// let (sink, titles) = TitleSink::channel();
    /// sink.publish("Yes, there is enough space.".to_string());
    ///
    /// assert_eq!(titles.recv().unwrap(), "Yes, there is enough space.");
    /// ```
    pub fn channel() -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl DisplaySink for TitleSink {
    fn publish(&self, text: String) {
        if self.sender.send(text).is_err() {
            log::warn!("display side went away; dropping prediction");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_after_receiver_drop_is_silent() {
        let (sink, titles) = TitleSink::channel();
        drop(titles);

        // must not panic or block
        sink.publish("late".to_string());
    }

    #[test]
    fn publish_preserves_order() {
        let (sink, titles) = TitleSink::channel();
        sink.publish("first".to_string());
        sink.publish("second".to_string());

        assert_eq!(titles.try_recv().unwrap(), "first");
        assert_eq!(titles.try_recv().unwrap(), "second");
    }
}
