//! Flat CSV form of a menu: one row per item, each row repeating the menu's
//! own fields.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::{info, warn};

use crate::errors::{AppResult, CsvError};
use crate::menu::{TrainingMenu, TrainingMenuItem};

pub const HEADER: &str = "id,title,description,itemId,itemName,itemDescription,durationInSeconds";

const HEADER_FIELDS: [&str; 7] = [
    "id",
    "title",
    "description",
    "itemId",
    "itemName",
    "itemDescription",
    "durationInSeconds",
];

/// Duration given to items whose duration column is not a usable integer
pub const INVALID_DURATION: u32 = 0;

pub fn encode(menu: &TrainingMenu) -> Result<String, CsvError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(HEADER_FIELDS)?;
    for item in &menu.items {
        let duration = item.duration_in_seconds.to_string();
        wtr.write_record([
            menu.id.as_str(),
            menu.title.as_str(),
            menu.description.as_str(),
            item.id.as_str(),
            item.name.as_str(),
            item.description.as_str(),
            duration.as_str(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn decode(input: &str) -> Result<TrainingMenu, CsvError> {
    let start = skip_blank_lines(input);
    let (header, body) = start.split_once('\n').unwrap_or((start, ""));

    if start.is_empty() || body.lines().all(|l| l.trim().is_empty()) {
        return Err(CsvError::TooFewLines);
    }
    if header.trim() != HEADER {
        return Err(CsvError::InvalidHeader);
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut menu: Option<TrainingMenu> = None;
    for record in rdr.records() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }

        let menu = menu.get_or_insert_with(|| TrainingMenu {
            id: field(&record, 0),
            title: field(&record, 1),
            description: field(&record, 2),
            items: Vec::new(),
        });
        menu.items.push(TrainingMenuItem {
            id: field(&record, 3),
            name: field(&record, 4),
            description: field(&record, 5),
            duration_in_seconds: parse_duration(&field(&record, 6)),
        });
    }

    menu.ok_or(CsvError::TooFewLines)
}

/// Reject menus carrying the invalid-duration sentinel
pub fn validate_durations(menu: &TrainingMenu) -> Result<(), CsvError> {
    match menu
        .items
        .iter()
        .find(|item| item.duration_in_seconds == INVALID_DURATION)
    {
        Some(item) => Err(CsvError::InvalidDuration(item.name.clone())),
        None => Ok(()),
    }
}

/// `<title>.csv`, with characters that are unsafe in file names replaced
pub fn export_file_name(menu: &TrainingMenu) -> String {
    let stem: String = menu
        .title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if stem.is_empty() {
        "menu.csv".to_string()
    } else {
        format!("{stem}.csv")
    }
}

pub fn export_to_dir(menu: &TrainingMenu, dir: &Path) -> AppResult<PathBuf> {
    let csv = encode(menu)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(menu));
    fs::write(&path, csv)?;
    info!(menu = %menu.id, path = %path.display(), "menu exported");
    Ok(path)
}

pub fn read_from_file(path: &Path) -> AppResult<TrainingMenu> {
    let text = fs::read_to_string(path)?;
    decode(&text).map_err(|e| {
        warn!(path = %path.display(), error = %e, "csv decode failed");
        e.into()
    })
}

fn skip_blank_lines(input: &str) -> &str {
    let mut rest = input;
    while let Some((line, tail)) = rest.split_once('\n') {
        if !line.trim().is_empty() {
            break;
        }
        rest = tail;
    }
    if rest.trim().is_empty() {
        ""
    } else {
        rest
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|f| f.trim().is_empty())
}

fn field(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().to_string()
}

fn parse_duration(raw: &str) -> u32 {
    parse_leading_int(raw)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(INVALID_DURATION)
}

/// Lenient integer parse: leading whitespace, an optional sign, then as many
/// digits as are present. `"90s"` is 90, `"abc"` is None.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = &digits[..digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len())];
    if digits.is_empty() {
        return None;
    }

    let value = digits.parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn item(id: &str, name: &str, description: &str, secs: u32) -> TrainingMenuItem {
        TrainingMenuItem {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            duration_in_seconds: secs,
        }
    }

    fn aim_drills() -> TrainingMenu {
        TrainingMenu {
            id: "menu_1".into(),
            title: "Aim Drills".into(),
            description: "warmup".into(),
            items: vec![
                item("item_1", "Tracking", "smooth", 300),
                item("item_2", "Flicks", "", 120),
            ],
        }
    }

    #[test]
    fn encode_writes_header_and_one_row_per_item() {
        let csv = encode(&aim_drills()).unwrap();
        assert_eq!(
            csv,
            "id,title,description,itemId,itemName,itemDescription,durationInSeconds\n\
             menu_1,Aim Drills,warmup,item_1,Tracking,smooth,300\n\
             menu_1,Aim Drills,warmup,item_2,Flicks,,120\n"
        );
    }

    #[test]
    fn encode_quotes_only_fields_that_need_it() {
        let mut menu = aim_drills();
        menu.title = "Aim, \"Pro\"".into();
        menu.items.truncate(1);
        menu.items[0].description = "line one\nline two".into();

        let csv = encode(&menu).unwrap();
        let row = csv.split_once('\n').unwrap().1;
        assert!(row.starts_with("menu_1,\"Aim, \"\"Pro\"\"\",warmup,item_1,Tracking,"));
        assert!(row.contains("\"line one\nline two\""));
    }

    #[test]
    fn roundtrip_plain_menu() {
        let menu = aim_drills();
        assert_eq!(decode(&encode(&menu).unwrap()).unwrap(), menu);
    }

    #[test]
    fn roundtrip_fields_with_commas_quotes_and_newlines() {
        let mut menu = aim_drills();
        menu.title = "Title, with \"quotes\"".into();
        menu.description = "multi\nline, text".into();
        menu.items[0].name = "a,b".into();
        menu.items[1].description = "say \"go\"\nthen stop".into();

        assert_eq!(decode(&encode(&menu).unwrap()).unwrap(), menu);
    }

    #[test]
    fn carriage_returns_are_quoted_and_kept() {
        let mut menu = aim_drills();
        menu.items[0].description = "pasted\r\nnotes".into();
        menu.items[1].name = "cr\ronly".into();

        let csv = encode(&menu).unwrap();
        assert!(csv.contains("\"pasted\r\nnotes\""));
        assert!(csv.contains("\"cr\ronly\""));
        assert_eq!(decode(&csv).unwrap(), menu);
    }

    #[test]
    fn decode_rejects_fewer_than_two_lines() {
        assert_matches!(decode(""), Err(CsvError::TooFewLines));
        assert_matches!(decode(HEADER), Err(CsvError::TooFewLines));
        assert_matches!(decode(&format!("\n{HEADER}\n\n  \n")), Err(CsvError::TooFewLines));
    }

    #[test]
    fn decode_rejects_header_mismatch() {
        let csv = "id,title,description,itemId,itemName,itemDescription,duration\n\
                   m,t,d,i,n,d,60\n";
        assert_matches!(decode(csv), Err(CsvError::InvalidHeader));

        let reordered = "title,id,description,itemId,itemName,itemDescription,durationInSeconds\n\
                         m,t,d,i,n,d,60\n";
        assert_matches!(decode(reordered), Err(CsvError::InvalidHeader));
    }

    #[test]
    fn decode_takes_menu_fields_from_first_row() {
        let csv = format!(
            "{HEADER}\nm1,First,desc,i1,A,,60\nm2,Second,other,i2,B,,30\n"
        );
        let menu = decode(&csv).unwrap();
        assert_eq!(menu.id, "m1");
        assert_eq!(menu.title, "First");
        assert_eq!(menu.items.len(), 2);
        assert_eq!(menu.items[1].name, "B");
    }

    #[test]
    fn decode_skips_blank_lines_and_accepts_crlf() {
        let csv = format!("\n\n{HEADER}\r\n\r\nm,T,D,i1,A,x,60\r\n\n   \nm,T,D,i2,B,y,30\r\n");
        let menu = decode(&csv).unwrap();
        assert_eq!(menu.items.len(), 2);
        assert_eq!(menu.items[0].description, "x");
        assert_eq!(menu.items[1].duration_in_seconds, 30);
    }

    #[test]
    fn malformed_duration_decodes_to_sentinel() {
        let csv = format!("{HEADER}\nm,T,D,i1,A,,abc\nm,T,D,i2,B,,-5\nm,T,D,i3,C,,90s\n");
        let menu = decode(&csv).unwrap();
        assert_eq!(menu.items[0].duration_in_seconds, INVALID_DURATION);
        assert_eq!(menu.items[1].duration_in_seconds, INVALID_DURATION);
        assert_eq!(menu.items[2].duration_in_seconds, 90);
        assert_matches!(validate_durations(&menu), Err(CsvError::InvalidDuration(name)) if name == "A");
    }

    #[test]
    fn short_rows_fill_missing_fields_with_empty_strings() {
        let csv = format!("{HEADER}\nm,T,D,i1,A\n");
        let menu = decode(&csv).unwrap();
        assert_eq!(menu.items[0].description, "");
        assert_eq!(menu.items[0].duration_in_seconds, INVALID_DURATION);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("300"), Some(300));
        assert_eq!(parse_leading_int("  42abc"), Some(42));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("12.9"), Some(12));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("99999999999999999999"), None);
    }

    #[test]
    fn test_export_file_name() {
        let mut menu = aim_drills();
        assert_eq!(export_file_name(&menu), "Aim Drills.csv");
        menu.title = "a/b:c".into();
        assert_eq!(export_file_name(&menu), "a_b_c.csv");
        menu.title = "   ".into();
        assert_eq!(export_file_name(&menu), "menu.csv");
        menu.title = "エイム練習".into();
        assert_eq!(export_file_name(&menu), "エイム練習.csv");
    }

    #[test]
    fn export_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let menu = aim_drills();
        let path = export_to_dir(&menu, dir.path()).unwrap();
        assert!(path.ends_with("Aim Drills.csv"));
        assert_eq!(read_from_file(&path).unwrap(), menu);
    }
}
