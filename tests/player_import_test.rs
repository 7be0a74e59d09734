use pitchside::models::Position;
use pitchside::services::{parse_players_csv, PLAYERS_CSV_TEMPLATE};
use pretty_assertions::assert_eq;

#[test]
fn template_parses_cleanly() {
    let parsed = parse_players_csv(PLAYERS_CSV_TEMPLATE.as_bytes());
    assert!(parsed.errors.is_empty());
    assert_eq!(parsed.rows.len(), 1);

    let (line, row) = &parsed.rows[0];
    assert_eq!(*line, 2);
    assert_eq!(row.first_name, "Alex");
    assert_eq!(row.position, Position::Forward);
    assert_eq!(row.team_name.as_deref(), Some("U14 Blue"));
    assert_eq!(row.jersey_number, Some(9));
}

#[test]
fn collects_row_errors_with_line_numbers() {
    let csv = "\
first_name,last_name,date_of_birth,position,team,jersey_number
Alex,Morgan,2012-07-02,forward,,
Jo,Park,02-07-2012,midfielder,,
Sam,Lee,2011-03-14,sweeper,,
,NoFirst,2011-03-14,defender,,
Ada,Okoye,2013-11-09,goalkeeper,,not-a-number
";
    let parsed = parse_players_csv(csv.as_bytes());

    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].0, 2);

    let failed_lines: Vec<usize> = parsed.errors.iter().map(|e| e.row).collect();
    assert_eq!(failed_lines, vec![3, 4, 5, 6]);

    assert!(parsed.errors[0].error.contains("date_of_birth"));
    assert!(parsed.errors[1].error.contains("position"));
    assert!(parsed.errors[2].error.contains("required"));
    assert!(parsed.errors[3].error.contains("jersey_number"));
}

#[test]
fn quoted_fields_with_commas_are_accepted() {
    let csv = "\
first_name,last_name,date_of_birth,position,team,jersey_number
\"Mary-Jane\",\"O'Brien, Jr\",2012-01-15,defender,U14 Blue,4
";
    let parsed = parse_players_csv(csv.as_bytes());
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    assert_eq!(parsed.rows[0].1.last_name, "O'Brien, Jr");
}

#[test]
fn optional_columns_can_be_empty() {
    let csv = "\
first_name,last_name,date_of_birth,position,team,jersey_number
Kim,Nguyen,2012-09-30,midfielder,,
";
    let parsed = parse_players_csv(csv.as_bytes());
    assert!(parsed.errors.is_empty());
    let row = &parsed.rows[0].1;
    assert_eq!(row.team_name, None);
    assert_eq!(row.jersey_number, None);
}

#[test]
fn whitespace_is_trimmed() {
    let csv = "\
first_name,last_name,date_of_birth,position,team,jersey_number
  Kim , Nguyen , 2012-09-30 , Midfielder , U12 Red , 7
";
    let parsed = parse_players_csv(csv.as_bytes());
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    let row = &parsed.rows[0].1;
    assert_eq!(row.first_name, "Kim");
    assert_eq!(row.position, Position::Midfielder);
    assert_eq!(row.jersey_number, Some(7));
}
