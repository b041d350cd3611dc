use super::*;

#[test]
fn fork_and_resolution_messages_use_distinct_tags() {
    assert_eq!(ControlMessage::fork(State::Hungry).tag, Tag::ForkProtocol);
    assert_eq!(
        ControlMessage::resolution(State::Thinking).tag,
        Tag::Resolution
    );
    assert_ne!(Tag::ForkProtocol.index(), Tag::Resolution.index());
}

#[test]
fn tag_indices_are_dense() {
    let mut indices: Vec<usize> = Tag::ALL.iter().map(|tag| tag.index()).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn envelope_keeps_source_and_tag() {
    let envelope = ControlMessage::resolution(State::Thinking).into_envelope(0);
    assert_eq!(envelope.source, 0);
    assert_eq!(envelope.tag, Tag::Resolution);
    assert_eq!(envelope.payload, Payload::State(State::Thinking));
}

#[test]
fn envelope_is_a_single_json_line() {
    let envelope = Envelope {
        source: 3,
        tag: Tag::Collective,
        payload: Payload::Snapshot(vec![State::Thinking, State::Eating]),
    };
    let line = envelope.to_json_string().unwrap();
    assert!(!line.contains('\n'));
    assert_eq!(Envelope::from_json_string(&line).unwrap(), envelope);
}

#[test]
fn malformed_line_is_a_codec_error() {
    assert!(matches!(
        Envelope::from_json_string("not json"),
        Err(Error::Codec(_))
    ));
}

#[test]
fn hello_parses() {
    let hello = Hello::from_json_string(r#"{"rank":7}"#).unwrap();
    assert_eq!(hello, Hello { rank: 7 });
}

#[test]
fn payload_accessors_reject_the_wrong_variant() {
    let err = Payload::Flag(true)
        .into_state(2, Tag::ForkProtocol)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedPayload {
            peer: 2,
            tag: Tag::ForkProtocol,
            ..
        }
    ));
    assert_eq!(
        Payload::Rank(4).into_rank(0, Tag::Collective).unwrap(),
        4
    );
    assert!(Payload::Flag(false).into_flag(0, Tag::Collective).is_ok());
    assert!(Payload::Rank(1).into_snapshot(0, Tag::Collective).is_err());
}
