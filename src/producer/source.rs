//! Payload sources feeding the broadcast loop

use bytes::Bytes;

use crate::capability::PayloadTypeTag;

use super::ph_event::PhEvent;

/// Supplies the next serialized payload on every tick
pub trait PayloadSource: Send {
    /// Tag of the payloads this source produces
    fn tag(&self) -> &PayloadTypeTag;

    /// Produce the current event
    fn next_payload(&mut self) -> Bytes;
}

/// Samples a pH reading and stamps it with the current time
pub struct PhEventSource {
    tag: PayloadTypeTag,
    read: Box<dyn FnMut() -> f64 + Send>,
}

impl PhEventSource {
    /// Source sampling `read` on every tick
    pub fn new(read: impl FnMut() -> f64 + Send + 'static) -> Self {
        Self {
            tag: PhEvent::TAG,
            read: Box::new(read),
        }
    }

    /// Source that always reports the same pH
    pub fn constant(ph: f64) -> Self {
        Self::new(move || ph)
    }

    /// Take one reading
    pub fn sample(&mut self) -> PhEvent {
        PhEvent::now((self.read)())
    }
}

impl Default for PhEventSource {
    fn default() -> Self {
        Self::constant(7.0)
    }
}

impl PayloadSource for PhEventSource {
    fn tag(&self) -> &PayloadTypeTag {
        &self.tag
    }

    fn next_payload(&mut self) -> Bytes {
        let event = self.sample();
        tracing::debug!(ph = event.ph, timestamp = event.timestamp, "Sampled pH");
        event.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let mut source = PhEventSource::default();
        let event = PhEvent::decode(&source.next_payload()).unwrap();

        assert_eq!(event.ph, 7.0);
        assert_eq!(source.tag(), &PhEvent::TAG);
    }

    #[test]
    fn test_reads_sensor_each_tick() {
        let mut readings = vec![6.5, 6.9].into_iter();
        let mut source = PhEventSource::new(move || readings.next().unwrap_or(7.0));

        assert_eq!(source.sample().ph, 6.5);
        assert_eq!(source.sample().ph, 6.9);
        assert_eq!(source.sample().ph, 7.0);
    }

    #[test]
    fn test_timestamps_do_not_go_backwards() {
        let mut source = PhEventSource::default();
        let first = source.sample();
        let second = source.sample();

        assert!(second.timestamp >= first.timestamp);
    }
}
