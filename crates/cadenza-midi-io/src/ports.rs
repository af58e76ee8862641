//! Helpers for working with several ports at once.

use cadenza_midi::Message;

use crate::error::{Error, Result};
use crate::port::{InputPort, OutputPort, Port};

/// Takes at most one pending message from each port, in port order, until all are drained.
///
/// Closed ports are skipped, including ones that close while being drained. Never blocks.
pub fn multi_receive<P>(ports: &[P]) -> Result<Vec<Message>>
where
    P: std::ops::Deref,
    P::Target: InputPort,
{
    let mut messages = Vec::new();
    let mut live: Vec<&P::Target> = ports.iter().map(|p| &**p).collect();
    while !live.is_empty() {
        let mut still_live = Vec::with_capacity(live.len());
        for port in live {
            if port.is_closed() {
                continue;
            }
            match port.receive(false) {
                Ok(Some(message)) => {
                    messages.push(message);
                    still_live.push(port);
                }
                Ok(None) | Err(Error::PortClosed) => {}
                Err(e) => return Err(e),
            }
        }
        live = still_live;
    }
    Ok(messages)
}

/// Like [`multi_receive`], but yields `(port index, message)` pairs lazily.
pub fn multi_iter_pending<'a, P>(ports: &'a [P]) -> impl Iterator<Item = (usize, Message)> + 'a
where
    P: std::ops::Deref,
    P::Target: InputPort,
{
    let mut live: Vec<usize> = (0..ports.len()).collect();
    let mut cursor = 0;
    std::iter::from_fn(move || {
        while !live.is_empty() {
            if cursor >= live.len() {
                cursor = 0;
            }
            let index = live[cursor];
            match ports[index].receive(false) {
                Ok(Some(message)) => {
                    cursor += 1;
                    return Some((index, message));
                }
                Ok(None) | Err(_) => {
                    live.remove(cursor);
                }
            }
        }
        None
    })
}

/// Sends one message to every port. Stops at the first failure.
pub fn multi_send<P>(ports: &[P], message: &Message) -> Result<()>
where
    P: std::ops::Deref,
    P::Target: OutputPort,
{
    for port in ports {
        port.send(message)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, VirtualBackend};
    use crate::port::{Input, Output, Port};

    fn pair(backend: &VirtualBackend, device: &str) -> (Input, Output) {
        backend.add_device(device);
        let (name, source) = backend.open_source(Some(device)).unwrap();
        let input = Input::new(name, source);
        let (name, sink) = backend.open_sink(Some(device)).unwrap();
        (input, Output::new(name, sink))
    }

    fn clock() -> Message {
        Message::default_for(cadenza_midi::MessageType::Clock)
    }

    #[test]
    fn test_multi_receive_round_robin() {
        let backend = VirtualBackend::new();
        let (in_a, out_a) = pair(&backend, "A");
        let (in_b, out_b) = pair(&backend, "B");

        out_a.send(&Message::note_on(0, 1, 1).unwrap()).unwrap();
        out_a.send(&Message::note_on(0, 2, 1).unwrap()).unwrap();
        out_b.send(&Message::note_on(1, 3, 1).unwrap()).unwrap();

        let inputs = [&in_a, &in_b];
        let notes: Vec<_> = multi_receive(&inputs)
            .unwrap()
            .iter()
            .filter_map(Message::note)
            .collect();
        assert_eq!(notes, vec![1, 3, 2]);
        assert!(multi_receive(&inputs).unwrap().is_empty());
    }

    #[test]
    fn test_multi_receive_skips_closed() {
        let backend = VirtualBackend::new();
        let (in_a, out_a) = pair(&backend, "A");
        let (in_b, out_b) = pair(&backend, "B");
        out_a.send(&clock()).unwrap();
        out_b.send(&clock()).unwrap();
        in_a.close();
        assert_eq!(multi_receive(&[&in_a, &in_b]).unwrap().len(), 1);
    }

    #[test]
    fn test_multi_receive_skips_ended_stream() {
        let backend = VirtualBackend::new();
        let (in_a, out_a) = pair(&backend, "A");
        let (in_b, out_b) = pair(&backend, "B");
        out_b.send(&clock()).unwrap();
        drop(out_a);
        assert!(backend.remove_device("A"));

        assert_eq!(multi_receive(&[&in_a, &in_b]).unwrap().len(), 1);
        assert!(in_a.is_closed());
    }

    #[test]
    fn test_multi_iter_pending_tags_ports() {
        let backend = VirtualBackend::new();
        let (in_a, out_a) = pair(&backend, "A");
        let (in_b, out_b) = pair(&backend, "B");
        out_b.send(&clock()).unwrap();
        out_a.send(&clock()).unwrap();
        out_b.send(&clock()).unwrap();

        let inputs = vec![Box::new(in_a), Box::new(in_b)];
        let tags: Vec<usize> = multi_iter_pending(&inputs).map(|(i, _)| i).collect();
        assert_eq!(tags, vec![0, 1, 1]);
    }

    #[test]
    fn test_multi_send_fans_out() {
        let backend = VirtualBackend::new();
        let (in_a, out_a) = pair(&backend, "A");
        let (in_b, out_b) = pair(&backend, "B");
        let msg = Message::program_change(4, 12).unwrap();
        multi_send(&[&out_a, &out_b], &msg).unwrap();
        assert_eq!(in_a.poll().unwrap(), Some(msg.clone()));
        assert_eq!(in_b.poll().unwrap(), Some(msg));

        out_b.close();
        assert!(multi_send(&[&out_a, &out_b], &clock()).is_err());
    }
}
