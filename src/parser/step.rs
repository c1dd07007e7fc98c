//! Minimal STEP (ISO 10303-21) reader: header schema and DATA entities.

use std::collections::BTreeMap;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    String(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Enum(String),
    Reference(u64),
    List(Vec<StepValue>),
    Null,
    Derived,
}

impl StepValue {
    #[must_use]
    pub fn as_reference(&self) -> Option<u64> {
        match self {
            Self::Reference(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value; integers widen to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[StepValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// References of a list value, skipping anything else.
    #[must_use]
    pub fn references(&self) -> Vec<u64> {
        self.as_list()
            .map(|items| items.iter().filter_map(StepValue::as_reference).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct StepEntity {
    pub id: u64,
    /// Upper-case entity name, e.g. `IFCWALL`.
    pub entity_type: String,
    pub values: Vec<StepValue>,
}

impl StepEntity {
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StepValue> {
        self.values.get(index)
    }

    #[must_use]
    pub fn get_ref(&self, index: usize) -> Option<u64> {
        self.get(index).and_then(StepValue::as_reference)
    }

    #[must_use]
    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(StepValue::as_str)
    }

    #[must_use]
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(StepValue::as_f64)
    }

    #[must_use]
    pub fn get_list(&self, index: usize) -> Option<&[StepValue]> {
        self.get(index).and_then(StepValue::as_list)
    }

    #[must_use]
    pub fn get_enum(&self, index: usize) -> Option<&str> {
        match self.get(index) {
            Some(StepValue::Enum(e)) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_refs(&self, index: usize) -> Vec<u64> {
        self.get(index).map(StepValue::references).unwrap_or_default()
    }

    #[must_use]
    pub fn is_a(&self, entity_type: &str) -> bool {
        self.entity_type.eq_ignore_ascii_case(entity_type)
    }
}

#[derive(Debug)]
pub struct StepFile {
    pub entities: BTreeMap<u64, StepEntity>,
    pub schema: String,
}

impl StepFile {
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let data_start = content.find("DATA;").ok_or_else(|| ParseError::InvalidStep {
            message: "missing DATA section".to_string(),
        })?;
        let schema = parse_schema(&content[..data_start]);

        let mut entities = BTreeMap::new();
        for statement in split_statements(&content[data_start + "DATA;".len()..]) {
            let statement = statement.trim();
            if statement == "ENDSEC" {
                break;
            }
            if statement.starts_with('#') {
                if let Some(entity) = Self::parse_entity(statement) {
                    entities.insert(entity.id, entity);
                }
            }
        }

        Ok(StepFile { entities, schema })
    }

    fn parse_entity(statement: &str) -> Option<StepEntity> {
        // Format: #123=IFCWALL('guid',#ref,'name',...)
        let eq_pos = statement.find('=')?;
        let id: u64 = statement[1..eq_pos].trim().parse().ok()?;

        let rest = statement[eq_pos + 1..].trim();
        let open = rest.find('(')?;
        let close = rest.rfind(')')?;
        if close < open {
            return None;
        }
        let entity_type = rest[..open].trim().to_ascii_uppercase();
        let values = Self::parse_values(&rest[open + 1..close]);

        Some(StepEntity {
            id,
            entity_type,
            values,
        })
    }

    fn parse_values(s: &str) -> Vec<StepValue> {
        let mut values = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut paren_depth = 0_i32;

        for ch in s.chars() {
            match ch {
                '\'' => {
                    in_string = !in_string;
                    current.push(ch);
                }
                '(' if !in_string => {
                    paren_depth += 1;
                    current.push(ch);
                }
                ')' if !in_string => {
                    paren_depth -= 1;
                    current.push(ch);
                }
                ',' if !in_string && paren_depth == 0 => {
                    values.push(Self::parse_single_value(&current));
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        if !current.trim().is_empty() {
            values.push(Self::parse_single_value(&current));
        }

        values
    }

    fn parse_single_value(s: &str) -> StepValue {
        let s = s.trim();

        if s == "$" {
            return StepValue::Null;
        }
        if s == "*" {
            return StepValue::Derived;
        }
        if let Some(stripped) = s.strip_prefix('#') {
            if let Ok(id) = stripped.trim().parse::<u64>() {
                return StepValue::Reference(id);
            }
        }
        if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
            return StepValue::String(decode_step_string(&s[1..s.len() - 1]));
        }
        if s.len() >= 2 && s.starts_with('.') && s.ends_with('.') {
            return match &s[1..s.len() - 1] {
                "T" => StepValue::Boolean(true),
                "F" => StepValue::Boolean(false),
                inner => StepValue::Enum(inner.to_string()),
            };
        }
        if s.starts_with('(') && s.ends_with(')') {
            return StepValue::List(Self::parse_values(&s[1..s.len() - 1]));
        }
        if let Ok(i) = s.parse::<i64>() {
            return StepValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return StepValue::Real(f);
        }
        // Typed value like IFCBOOLEAN(.T.) or IFCLENGTHMEASURE(900.)
        if let (Some(open), true) = (s.find('('), s.ends_with(')')) {
            return Self::parse_single_value(&s[open + 1..s.len() - 1]);
        }

        StepValue::String(s.to_string())
    }

    #[must_use]
    pub fn get_entity(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Entities of exactly `entity_type`, in id order.
    #[must_use]
    pub fn get_entities_by_type(&self, entity_type: &str) -> Vec<&StepEntity> {
        self.entities
            .values()
            .filter(|e| e.is_a(entity_type))
            .collect()
    }
}

fn parse_schema(header: &str) -> String {
    header
        .find("FILE_SCHEMA")
        .and_then(|pos| {
            let rest = &header[pos..];
            let start = rest.find('\'')? + 1;
            let end = rest[start..].find('\'')?;
            Some(rest[start..start + end].to_string())
        })
        .unwrap_or_default()
}

/// Splits on `;` outside string literals and comments. Statements may span
/// lines.
fn split_statements(data: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut in_comment = false;
    let bytes = data.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_comment {
            if b == b'*' && bytes.get(i + 1) == Some(&b'/') {
                in_comment = false;
                i += 1;
            }
        } else if b == b'\'' {
            in_string = !in_string;
        } else if !in_string && b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            in_comment = true;
            i += 1;
        } else if !in_string && b == b';' {
            statements.push(strip_comments(&data[start..i]));
            start = i + 1;
        }
        i += 1;
    }

    statements
}

/// Drops a leading `/* ... */` block, which is where exporters put them.
fn strip_comments(statement: &str) -> &str {
    let trimmed = statement.trim_start();
    if let Some(rest) = trimmed.strip_prefix("/*") {
        if let Some(end) = rest.find("*/") {
            return strip_comments(&rest[end + 2..]);
        }
    }
    trimmed
}

/// Decode STEP/IFC encoded strings with Unicode escape sequences.
/// Supports:
/// - `\X2\XXXX\X0\` - 2-byte Unicode (BMP), can have multiple 4-char hex codes
/// - `\X\XX` - 1-byte ISO 8859-1
/// - `\S\c` - ISO 8859-1 upper half
/// - `\\` - escaped backslash
/// - `''` - escaped apostrophe
fn decode_step_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek() {
                Some('X') => {
                    chars.next();
                    match chars.peek() {
                        Some('2') => {
                            chars.next(); // '2'
                            chars.next(); // '\'

                            let mut hex = String::new();
                            while let Some(&c) = chars.peek() {
                                if c == '\\' {
                                    break;
                                }
                                hex.push(c);
                                chars.next();
                            }
                            // \X0\ terminator
                            for _ in 0..4 {
                                chars.next();
                            }
                            for chunk in hex.as_bytes().chunks(4) {
                                let decoded = std::str::from_utf8(chunk)
                                    .ok()
                                    .and_then(|h| u32::from_str_radix(h, 16).ok())
                                    .and_then(char::from_u32);
                                if let Some(c) = decoded {
                                    result.push(c);
                                }
                            }
                        }
                        Some('\\') => {
                            chars.next();
                            let hex: String = chars.by_ref().take(2).collect();
                            if let Ok(code) = u8::from_str_radix(&hex, 16) {
                                result.push(char::from(code));
                            }
                        }
                        _ => result.push_str("\\X"),
                    }
                }
                Some('\\') => {
                    chars.next();
                    result.push('\\');
                }
                Some('S') => {
                    chars.next(); // 'S'
                    chars.next(); // '\'
                    if let Some(c) = chars.next().and_then(|c| char::from_u32(u32::from(c) + 128)) {
                        result.push(c);
                    }
                }
                _ => result.push('\\'),
            }
        } else if ch == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
            }
            result.push('\'');
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FILE: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
/* exported */ #1=IFCSPACE('2Vx$kq',#2,'101','Caf\\X2\\00E9\\X0\\; lobby',$,$,$,
  'Ground (north) wing',.ELEMENT.,.INTERNAL.,$);
#2 = IFCOWNERHISTORY($,$,$,.ADDED.,$,$,$,0);
#3=IFCPROPERTYSINGLEVALUE('Width',$,IFCPOSITIVELENGTHMEASURE(1.2E3),$);
#4=IFCCARTESIANPOINT((0.,-1.5,2.));
#5=IFCLABEL('O''Brien');
ENDSEC;
END-ISO-10303-21;
";

    #[test]
    fn reads_schema_and_multiline_entities() {
        let step = StepFile::parse(FILE).unwrap();
        assert_eq!(step.schema, "IFC4");
        assert_eq!(step.entities.len(), 5);

        let space = step.get_entity(1).unwrap();
        assert_eq!(space.entity_type, "IFCSPACE");
        assert_eq!(space.get_str(2), Some("101"));
        assert_eq!(space.get_str(3), Some("Caf\u{e9}; lobby"));
        assert_eq!(space.get_str(7), Some("Ground (north) wing"));
        assert_eq!(space.get_enum(9), Some("INTERNAL"));
        assert_eq!(space.get_ref(1), Some(2));
        assert_eq!(space.get(10), Some(&StepValue::Null));
    }

    #[test]
    fn parses_typed_and_list_values() {
        let step = StepFile::parse(FILE).unwrap();
        assert_eq!(step.get_entity(3).unwrap().get_f64(2), Some(1200.0));
        assert_eq!(step.get_entity(2).unwrap().get_f64(7), Some(0.0));

        let point = step.get_entity(4).unwrap();
        let coords: Vec<f64> = point
            .get_list(0)
            .unwrap()
            .iter()
            .filter_map(StepValue::as_f64)
            .collect();
        assert_eq!(coords, vec![0.0, -1.5, 2.0]);
    }

    #[test]
    fn decodes_escapes() {
        let step = StepFile::parse(FILE).unwrap();
        assert_eq!(step.get_entity(5).unwrap().get_str(0), Some("O'Brien"));
        assert_eq!(decode_step_string("\\X\\E9t\\S\\a"), "\u{e9}t\u{e1}");
        assert_eq!(decode_step_string("a\\\\b"), "a\\b");
    }

    #[test]
    fn entities_by_type_in_id_order() {
        let content = "DATA;#9=IFCDOOR($);#2=IFCDOOR($);#5=IFCWALL($);ENDSEC;";
        let step = StepFile::parse(content).unwrap();
        let ids: Vec<u64> = step
            .get_entities_by_type("IfcDoor")
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2, 9]);
        assert_eq!(step.schema, "");
    }

    #[test]
    fn missing_data_section_is_invalid() {
        assert!(matches!(
            StepFile::parse("ISO-10303-21;\nHEADER;\nENDSEC;"),
            Err(ParseError::InvalidStep { .. })
        ));
    }
}
