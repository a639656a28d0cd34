use deskmind::context::*;
use deskmind::*;

#[tokio::test]
async fn test_retrieve_by_keyword_overlap() {
    let memory = InMemoryMemory::new();
    memory
        .persist_turn("my favourite editor is helix", "Noted!", &[])
        .await
        .unwrap();
    memory
        .persist_turn("what's the weather", "Sunny", &[])
        .await
        .unwrap();

    let found = memory.retrieve_relevant("open my editor", 3).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0], "User: my favourite editor is helix | Assistant: Noted!");
}

#[tokio::test]
async fn test_retrieve_prefers_higher_score_then_newest() {
    let memory = InMemoryMemory::new();
    memory.remember("rust compiler errors", &[]).unwrap();
    memory.remember("rust borrow checker compiler", &[]).unwrap();
    memory.remember("rust lifetimes", &[]).unwrap();

    let found = memory
        .retrieve_relevant("rust compiler question", 3)
        .await
        .unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(found[0], "rust borrow checker compiler");
    assert_eq!(found[1], "rust compiler errors");
    assert_eq!(found[2], "rust lifetimes");

    let top = memory.retrieve_relevant("rust compiler", 1).await.unwrap();
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn test_tags_count_as_keywords() {
    let memory = InMemoryMemory::new();
    memory
        .remember("something unrelated", &["spotify".to_string()])
        .unwrap();
    let found = memory.retrieve_relevant("spotify please", 2).await.unwrap();
    assert_eq!(found, vec!["something unrelated".to_string()]);
}

#[tokio::test]
async fn test_memory_is_bounded() {
    let memory = InMemoryMemory::with_capacity(2);
    for i in 0..5 {
        memory.remember(&format!("note number {}", i), &[]).unwrap();
    }
    assert_eq!(memory.len(), 2);
    assert!(memory.retrieve_relevant("anything", 0).await.unwrap().is_empty());
}

#[test]
fn test_detect_mood() {
    assert_eq!(detect_mood("this is awesome"), Mood::Happy);
    assert_eq!(detect_mood("I feel so lonely today"), Mood::Sad);
    assert_eq!(detect_mood("deadline tomorrow, help"), Mood::Stressed);
    assert_eq!(detect_mood("ugh this is broken"), Mood::Angry);
    assert_eq!(detect_mood("why is the sky blue"), Mood::Curious);
    assert_eq!(detect_mood("open chrome"), Mood::Neutral);
    // first family wins
    assert_eq!(detect_mood("how great is that"), Mood::Happy);
}

#[test]
fn test_time_context_boundaries() {
    assert!(time_context(0).contains("late"));
    assert!(time_context(5).contains("late"));
    assert!(time_context(6).contains("morning"));
    assert!(time_context(12).contains("afternoon"));
    assert!(time_context(17).contains("evening"));
    assert!(time_context(21).contains("night"));
    assert_eq!(greeting(9), "Good morning");
    assert_eq!(greeting(22), "Good evening");
}

#[test]
fn test_augment_layout() {
    let text = augment("open chrome", &[], 9);
    assert_eq!(
        text,
        format!(
            "[Mood: neutral. Tone: {} {}]\nopen chrome",
            Mood::Neutral.tone(),
            time_context(9)
        )
    );

    let text = augment("open chrome", &["User: hi | Assistant: hello".to_string()], 9);
    assert!(text.contains("\nRelevant Memories:\n- User: hi | Assistant: hello\n\n"));
    assert!(text.ends_with("open chrome"));
}
