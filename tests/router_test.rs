use deskmind::*;

fn only_local() -> Availability {
    Availability {
        local: true,
        cloud_a: false,
        cloud_b: false,
    }
}

#[test]
fn test_forced_brain_wins() {
    let avail = Availability::none();
    assert_eq!(
        route("open chrome", Some(BrainId::CloudB), &avail),
        BrainId::CloudB
    );
    assert_eq!(
        route("analyze my workflow", Some(BrainId::Local), &Availability::all()),
        BrainId::Local
    );
}

#[test]
fn test_forced_auto_is_ignored() {
    assert_eq!(
        route("open chrome", Some(BrainId::Auto), &Availability::all()),
        BrainId::Local
    );
}

#[test]
fn test_local_down_falls_to_cloud() {
    let avail = Availability {
        local: false,
        cloud_a: false,
        cloud_b: true,
    };
    assert_eq!(route("open chrome", None, &avail), BrainId::CloudB);
}

#[test]
fn test_nothing_up_still_returns_local() {
    assert_eq!(
        route("prepare my environment", None, &Availability::none()),
        BrainId::Local
    );
}

#[test]
fn test_visual_prefers_cloud_a() {
    assert_eq!(
        route("what do you see on my screen", None, &Availability::all()),
        BrainId::CloudA
    );
    assert_eq!(
        route("what do you see on my screen", None, &only_local()),
        BrainId::Local
    );
}

#[test]
fn test_visual_keyword_needs_word_boundary() {
    // "seen" must not trigger the "see" keyword
    assert_eq!(
        route("have you seen my keys", None, &Availability::all()),
        BrainId::Local
    );
}

#[test]
fn test_simple_pattern_goes_local() {
    let avail = Availability::all();
    assert_eq!(route("open spotify", None, &avail), BrainId::Local);
    assert_eq!(route("what is my cpu usage", None, &avail), BrainId::Local);
    assert_eq!(route("show running processes", None, &avail), BrainId::Local);
}

#[test]
fn test_complex_goes_cloud() {
    let avail = Availability::all();
    assert_eq!(
        route("prepare my coding environment", None, &avail),
        BrainId::CloudA
    );

    let no_a = Availability {
        local: true,
        cloud_a: false,
        cloud_b: true,
    };
    assert_eq!(
        route("prepare my coding environment", None, &no_a),
        BrainId::CloudB
    );
    assert_eq!(
        route("prepare my coding environment", None, &only_local()),
        BrainId::Local
    );
}

#[test]
fn test_word_count_heuristic() {
    let avail = Availability::all();
    assert_eq!(route("tell me a joke", None, &avail), BrainId::Local);

    let medium = "i would like you to think about my day a little bit";
    assert_eq!(route(medium, None, &avail), BrainId::Local);

    let long = "i would like you to think very carefully about how my day went and tell me how it was overall";
    assert_eq!(route(long, None, &avail), BrainId::CloudA);
}

#[test]
fn test_route_is_deterministic() {
    let avail = Availability {
        local: true,
        cloud_a: true,
        cloud_b: false,
    };
    let text = "compare these two laptops for me";
    let first = route(text, None, &avail);
    for _ in 0..10 {
        assert_eq!(route(text, None, &avail), first);
    }
}

#[test]
fn test_parse_brain_prefix() {
    let (brain, text) = parse_brain_prefix("@claude write a poem");
    assert_eq!(brain, Some(BrainId::CloudB));
    assert_eq!(text, "write a poem");

    let (brain, text) = parse_brain_prefix("@Gemini   what's up");
    assert_eq!(brain, Some(BrainId::CloudA));
    assert_eq!(text, "what's up");

    let (brain, text) = parse_brain_prefix("@ollama open chrome");
    assert_eq!(brain, Some(BrainId::Local));
    assert_eq!(text, "open chrome");
}

#[test]
fn test_parse_brain_prefix_absent() {
    let (brain, text) = parse_brain_prefix("email bob@example.com");
    assert_eq!(brain, None);
    assert_eq!(text, "email bob@example.com");

    let (brain, _) = parse_brain_prefix("@localhost is up");
    assert_eq!(brain, None);
}

#[test]
fn test_brain_id_parse_aliases() {
    assert_eq!(BrainId::parse("anthropic"), Some(BrainId::CloudB));
    assert_eq!(BrainId::parse("google"), Some(BrainId::CloudA));
    assert_eq!(BrainId::parse(" AUTO "), Some(BrainId::Auto));
    assert_eq!(BrainId::parse("gpt"), None);
    assert_eq!(BrainId::CloudA.to_string(), "cloud-a");
}
