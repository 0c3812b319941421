use serde_json::json;
use storyboard_core::board::{CardSpec, FrameSpec, Placement, ShapeKind, ShapeSpec, TextSpec};
use storyboard_core::content::encode_description;
use storyboard_core::{
    Board, EngineConfig, ExtractionService, FieldKind, InMemoryBoard, ItemId, Passage,
    ProjectedStory, ProjectionService, StartMode, Story, StoryError,
};

fn placement() -> Placement {
    Placement {
        x: 100.0,
        y: 100.0,
        width: 200.0,
        height: None,
    }
}

fn story(name: &str) -> Story {
    let mut story = Story::new(name);
    story.format = "harlowe".to_string();
    story.format_version = "3.3.9".to_string();
    story.start = "A".to_string();
    story.passages = vec![
        Passage::new("A", "[[B]]"),
        Passage::new("B", "[[C]]"),
        Passage::new("C", "The end."),
    ];
    story
}

fn projected(board: &mut InMemoryBoard, config: &EngineConfig) -> ProjectedStory {
    ProjectionService::new(board, config)
        .project(&story("Extraction"))
        .unwrap()
}

fn marker_connector(board: &InMemoryBoard, marker: ItemId) -> ItemId {
    board
        .all_connectors()
        .iter()
        .find(|connector| connector.start == marker)
        .map(|connector| connector.id)
        .unwrap()
}

fn extract(
    board: &InMemoryBoard,
    config: &EngineConfig,
    container: ItemId,
) -> Result<Story, StoryError> {
    ExtractionService::new(board, config).extract(container, StartMode::FromMarker)
}

#[test]
fn start_marker_without_connector_fails() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    let connector = marker_connector(&board, projected.start_marker);
    board.remove_connector(connector).unwrap();

    let err = extract(&board, &config, projected.container).unwrap_err();
    assert!(matches!(err, StoryError::NoStart { marker_found: true }));
}

#[test]
fn start_marker_with_two_connectors_is_ambiguous() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    board
        .create_connector(projected.start_marker, projected.card("C").unwrap())
        .unwrap();

    let err = extract(&board, &config, projected.container).unwrap_err();
    assert!(matches!(err, StoryError::AmbiguousStart { connectors: 2 }));
}

#[test]
fn reconnected_marker_moves_the_start() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    let connector = marker_connector(&board, projected.start_marker);
    board.remove_connector(connector).unwrap();
    board
        .create_connector(projected.start_marker, projected.card("B").unwrap())
        .unwrap();

    let story = extract(&board, &config, projected.container).unwrap();
    assert_eq!(story.start, "B");
}

#[test]
fn incoming_connectors_do_not_count_as_start() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    board
        .create_connector(projected.card("C").unwrap(), projected.start_marker)
        .unwrap();

    let story = extract(&board, &config, projected.container).unwrap();
    assert_eq!(story.start, "A");
}

#[test]
fn missing_start_marker_fails() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    board.remove_item(projected.start_marker).unwrap();

    let err = extract(&board, &config, projected.container).unwrap_err();
    assert!(matches!(err, StoryError::NoStart { marker_found: false }));
}

#[test]
fn override_mode_ignores_the_marker() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    board.remove_item(projected.start_marker).unwrap();
    let card = projected.card("C").unwrap();

    let story = ExtractionService::new(&board, &config)
        .extract(projected.container, StartMode::FromCard(card))
        .unwrap();
    assert_eq!(story.start, "C");

    let story = ExtractionService::new(&board, &config)
        .extract_from_card(card)
        .unwrap();
    assert_eq!(story.start, "C");
    assert_eq!(story.passages.len(), 3);
}

#[test]
fn missing_fields_are_reported_in_order() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);

    board.remove_item(projected.ifid_field).unwrap();
    let err = extract(&board, &config, projected.container).unwrap_err();
    assert!(matches!(err, StoryError::MissingField(FieldKind::Ifid)));

    board.remove_item(projected.title_field).unwrap();
    let err = extract(&board, &config, projected.container).unwrap_err();
    assert!(matches!(err, StoryError::MissingField(FieldKind::Title)));
}

#[test]
fn missing_format_field_is_reported() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    board.remove_item(projected.format_field).unwrap();

    let err = extract(&board, &config, projected.container).unwrap_err();
    assert!(matches!(err, StoryError::MissingField(FieldKind::Format)));
    assert_eq!(err.to_string(), "no story format was found");
}

#[test]
fn container_without_cards_has_no_passages() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    for (_, card) in &projected.cards {
        board.remove_item(*card).unwrap();
    }

    let err = extract(&board, &config, projected.container).unwrap_err();
    assert!(matches!(err, StoryError::MissingField(FieldKind::Passages)));
}

#[test]
fn duplicate_title_fields_are_ambiguous() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    let copy = board
        .create_shape(
            projected.container,
            ShapeSpec {
                content: "<p><b>Copy</b></p>".to_string(),
                shape: ShapeKind::RoundRectangle,
                placement: placement(),
                color: "#000000".to_string(),
            },
        )
        .unwrap();
    board
        .set_metadata(copy, &config.metadata_key, json!({"type": "title-field"}))
        .unwrap();

    let err = extract(&board, &config, projected.container).unwrap_err();
    assert!(matches!(
        err,
        StoryError::AmbiguousField {
            field: FieldKind::Title,
            count: 2
        }
    ));
}

#[test]
fn untagged_cards_become_passages_and_other_objects_are_ignored() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    let tag = board.create_tag("<b>manual</b>").unwrap();
    board
        .create_card(
            projected.container,
            CardSpec {
                title: "Hand Made".to_string(),
                description: encode_description("drawn by hand"),
                tag_ids: vec![tag],
                placement: placement(),
                theme: "#414bb2".to_string(),
            },
        )
        .unwrap();
    board
        .create_text(
            projected.container,
            TextSpec {
                content: "<p>sticky note</p>".to_string(),
                placement: placement(),
                color: "#000000".to_string(),
            },
        )
        .unwrap();

    let story = extract(&board, &config, projected.container).unwrap();
    assert_eq!(story.passages.len(), 4);
    let manual = story.passage("Hand Made").unwrap();
    assert_eq!(manual.text, "drawn by hand");
    assert!(manual.tags.contains("manual"));
}

#[test]
fn retagged_cards_are_read_back() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    let ending = board.create_tag("ending").unwrap();
    let spoiler = board.create_tag("<p>spoiler</p>").unwrap();
    board
        .set_tag_ids(projected.card("C").unwrap(), vec![ending, spoiler])
        .unwrap();

    let story = extract(&board, &config, projected.container).unwrap();
    let tags: Vec<&str> = story
        .passage("C")
        .unwrap()
        .tags
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(tags, vec!["ending", "spoiler"]);
    assert!(story.passage("A").unwrap().tags.is_empty());
}

#[test]
fn edited_fields_are_read_as_plain_text() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    board
        .set_title(projected.title_field, "<p><b>Renamed</b> &lt;v2&gt;</p>")
        .unwrap();
    board
        .set_title(projected.format_field, "<p>snowman</p>")
        .unwrap();

    let story = extract(&board, &config, projected.container).unwrap();
    assert_eq!(story.name, "Renamed <v2>");
    assert_eq!(story.format, "snowman");
    assert_eq!(story.format_version, "2.0.2");
}

#[test]
fn non_story_items_are_rejected() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let projected = projected(&mut board, &config);
    let other = board
        .create_frame(FrameSpec {
            title: "Notes".to_string(),
            placement: placement(),
            fill_color: "#ffffff".to_string(),
        })
        .unwrap();

    let err = extract(&board, &config, other).unwrap_err();
    assert!(matches!(err, StoryError::NotAStory(id) if id == other));

    let card = projected.card("A").unwrap();
    let err = extract(&board, &config, card).unwrap_err();
    assert!(matches!(err, StoryError::NotAStory(_)));
}

#[test]
fn list_stories_reports_story_containers_only() {
    let config = EngineConfig::default();
    let mut board = InMemoryBoard::new();
    let first = ProjectionService::new(&mut board, &config)
        .project(&story("First"))
        .unwrap();
    board
        .create_frame(FrameSpec {
            title: "Notes".to_string(),
            placement: placement(),
            fill_color: "#ffffff".to_string(),
        })
        .unwrap();
    let second = ProjectionService::new(&mut board, &config)
        .project(&story("Second"))
        .unwrap();
    board.remove_item(second.title_field).unwrap();
    let third = ProjectionService::new(&mut board, &config)
        .project(&story("Third"))
        .unwrap();

    let stories = ExtractionService::new(&board, &config).list_stories().unwrap();
    let titles: Vec<_> = stories.iter().map(|summary| summary.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Third"]);
    assert_eq!(stories[0].container, first.container);
    assert_eq!(stories[1].container, third.container);
}
