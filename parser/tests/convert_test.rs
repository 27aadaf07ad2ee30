use rs2_gamestats::convert_lines;
use rs2_gamestats::Document;

const SAMPLE_LOG: &[&str] = &[
    "120.5 2023/04/29 X 14:30:00 1682775000.0 Compound",
    r#"LOGIN 1.5 1 0 "Sgt. Fish""#,
    "LOGIN 2.0 2 0 Chips",
    r#"SPAWN 5.0 1 0 "Sgt. Fish" "10.0,20.0,0.5" 0 Rifleman"#,
    r#"SPAWN 5.5 2 0 Chips "30.0,-20.0,0.5" 1 Grenadier"#,
    r#"DMG 8.0 35 2 0 1 0 "1.0,1.0,1.0" "0.0,0.0,9.0" Bullet RifleRound"#,
    r#"DAMAGE 8.5 20 1 0 2 0 "1.0,1.0,1.0" "0.0,0.0,9.0" Frag Grenade"#,
    r#"KILL 10.0 1 0 2 0 0 1 "1.0,2.0,3.0" "0.1,0.2,0.3" Bullet Head 3 "4.0,5.0,6.0" 50 1200"#,
    "ROUNDEND 1",
    "MATCHWON 60.0 1 8 1",
    r#"LOGOUT 65.0 2 0 Chips"#,
    "TEABAG 66.0 1 2",
];

#[test]
fn converts_a_whole_session_log() {
    let conversion = convert_lines(SAMPLE_LOG).unwrap();
    assert!(conversion.skipped.is_empty());

    let events = &conversion.document.events;
    assert_eq!(events.logins.len(), 2);
    assert_eq!(events.logouts.len(), 1);
    assert_eq!(events.spawns.len(), 2);
    assert_eq!(events.damage.len(), 2);
    assert_eq!(events.kills.len(), 1);
    assert_eq!(events.round_ends.len(), 1);
    assert_eq!(events.matches_won.len(), 1);
    assert_eq!(events.other.len(), 1);

    // The dropped-timestamp ROUNDEND rides 1ms behind the KILL before it.
    let kill_at = events.kills[0].base.datetime;
    assert_eq!(
        events.round_ends[0].base.datetime - kill_at,
        chrono::Duration::milliseconds(1)
    );

    assert_eq!(conversion.document.header.tag, "Compound");
}

#[test]
fn document_round_trips_through_json() {
    let conversion = convert_lines(SAMPLE_LOG).unwrap();
    let encoded = serde_json::to_string_pretty(&conversion.document).unwrap();
    let decoded: Document = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded.header, conversion.document.header);
    assert_eq!(decoded.events, conversion.document.events);
}

#[test]
fn serialized_shape_matches_the_interchange_format() {
    let conversion = convert_lines(SAMPLE_LOG).unwrap();
    let value = serde_json::to_value(&conversion.document).unwrap();

    // Timestamps are naive ISO-8601 strings.
    assert_eq!(
        value.pointer("/header/start_datetime").unwrap(),
        "2023-04-29T14:30:00"
    );
    assert_eq!(
        value.pointer("/events/LOGIN/0/datetime").unwrap(),
        "2023-04-29T14:30:01.500"
    );

    // Vectors are 3-element numeric arrays.
    assert_eq!(
        value
            .pointer("/events/KILL/0/hit_location")
            .unwrap()
            .as_array()
            .unwrap()
            .len(),
        3
    );

    // Win conditions are symbolic names, not integers.
    assert_eq!(
        value.pointer("/events/MATCHWON/0/win_condition").unwrap(),
        "MostPoints"
    );

    // Composed ids survive as plain integers.
    assert_eq!(
        value
            .pointer("/events/KILL/0/killer_id")
            .unwrap()
            .as_u64()
            .unwrap(),
        1
    );
}

#[test]
fn other_bucket_is_omitted_when_empty() {
    let conversion = convert_lines(&SAMPLE_LOG[..3]).unwrap();
    let value = serde_json::to_value(&conversion.document).unwrap();
    assert!(value.pointer("/events/OTHER").is_none());
    assert!(value.pointer("/events/LOGIN").is_some());
}
