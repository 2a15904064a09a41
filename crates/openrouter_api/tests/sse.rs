use openrouter_api::{ApiStreamEvent, ResponseStatus, SseStreamParser};

#[test]
fn sse_framing_parses_done_and_deltas() {
    let payload = concat!(
        ": OPENROUTER PROCESSING\n\n",
        "data: {\"type\":\"response.output_text.delta\",\"delta\":\"hel\"}\n\n",
        "data: [DONE]\n\n",
        "data: {\"type\":\"response.reasoning_summary_text.delta\",\"delta\":\"ok\"}\n\n"
    );

    let events = SseStreamParser::parse_frames(payload);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], ApiStreamEvent::OutputTextDelta { .. }));
    assert!(matches!(
        events[1],
        ApiStreamEvent::ReasoningSummaryTextDelta { .. }
    ));
}

#[test]
fn sse_parser_maps_terminal_aliases_and_failed() {
    let payload = concat!(
        "data: {\"type\":\"response.completed\",\"response\":{\"status\":\"completed\",\"output_text\":\"hi\"}}\n\n",
        "data: {\"type\":\"response.incomplete\",\"response\":{\"status\":\"incomplete\"}}\n\n",
        "data: {\"type\":\"response.failed\",\"response\":{\"error\":{\"message\":\"boom\"}}}\n\n"
    );

    let events = SseStreamParser::parse_frames(payload);
    assert_eq!(events.len(), 3);

    if let ApiStreamEvent::ResponseCompleted { status, response } = &events[0] {
        assert_eq!(*status, Some(ResponseStatus::Completed));
        assert_eq!(response["output_text"], "hi");
    } else {
        panic!("first event should be completed");
    }

    if let ApiStreamEvent::ResponseCompleted { status, .. } = &events[1] {
        assert_eq!(*status, Some(ResponseStatus::Incomplete));
    } else {
        panic!("second event should be the incomplete alias");
    }

    assert_eq!(
        events[2],
        ApiStreamEvent::ResponseFailed {
            message: Some("boom".to_string())
        }
    );
}

#[test]
fn sse_parser_keeps_unknown_and_drops_malformed() {
    let payload = concat!(
        "data: {\"type\":\"response.created\",\"foo\":\"bar\"}\n\n",
        "data: {broken-json\n\n",
        "data: {\"type\":\"response.output_text.delta\",\"delta\":\"x\"}\n\n"
    );

    let events = SseStreamParser::parse_frames(payload);
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        ApiStreamEvent::Unknown { event_type, .. } if event_type == "response.created"
    ));
    assert!(matches!(events[1], ApiStreamEvent::OutputTextDelta { .. }));
}

#[test]
fn sse_parser_maps_reasoning_delta_alias() {
    let events = SseStreamParser::parse_frames(
        "data: {\"type\":\"response.reasoning.delta\",\"delta\":\"step\"}\n\n",
    );

    assert_eq!(
        events,
        vec![ApiStreamEvent::ReasoningTextDelta {
            delta: "step".to_string()
        }]
    );
}
