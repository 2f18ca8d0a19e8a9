use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn attribute_i64(&self, name: &str) -> Option<i64> {
        self.attribute(name)?.trim().parse::<i64>().ok()
    }

    pub fn attribute_u32(&self, name: &str) -> Option<u32> {
        self.attribute(name)?.trim().parse::<u32>().ok()
    }

    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.children
            .iter()
            .filter(move |child| child.name.eq_ignore_ascii_case(name))
    }

    pub fn first_child<'a>(&'a self, name: &'a str) -> Option<&'a XmlElement> {
        self.children_named(name).next()
    }
}

pub fn load_document(path: &Path) -> Result<XmlElement, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    parse_document(&content)
        .map_err(|err| format!("{}: {}", path.display(), err))
}

pub fn parse_document(content: &str) -> Result<XmlElement, String> {
    let chars: Vec<char> = content.chars().collect();
    let mut cursor = Cursor { chars, pos: 0 };

    cursor.skip_misc();
    let root = parse_element(&mut cursor)?;
    cursor.skip_misc();
    if !cursor.at_end() {
        return Err(format!(
            "trailing content after document element at offset {}",
            cursor.pos
        ));
    }
    Ok(root)
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(idx, ch)| self.chars.get(self.pos + idx) == Some(&ch))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.pos += 1;
        }
    }

    // Skips whitespace, processing instructions, comments, and doctype
    // declarations between elements.
    fn skip_misc(&mut self) {
        loop {
            self.skip_whitespace();
            if self.starts_with("<!--") {
                self.skip_until("-->");
            } else if self.starts_with("<?") {
                self.skip_until("?>");
            } else if self.starts_with("<!") {
                self.skip_until(">");
            } else {
                return;
            }
        }
    }

    fn skip_until(&mut self, terminator: &str) {
        while !self.at_end() {
            if self.starts_with(terminator) {
                self.pos += terminator.chars().count();
                return;
            }
            self.pos += 1;
        }
    }

    fn read_name(&mut self) -> Result<String, String> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(ch) if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | ':' | '.')
        ) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(format!("expected name at offset {}", start));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }
}

fn parse_element(cursor: &mut Cursor) -> Result<XmlElement, String> {
    if cursor.bump() != Some('<') {
        return Err(format!("expected '<' at offset {}", cursor.pos));
    }
    let name = cursor.read_name()?;
    let mut element = XmlElement {
        name,
        attributes: Vec::new(),
        children: Vec::new(),
    };

    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some('/') => {
                cursor.pos += 1;
                if cursor.bump() != Some('>') {
                    return Err(format!("expected '>' after '/' at offset {}", cursor.pos));
                }
                return Ok(element);
            }
            Some('>') => {
                cursor.pos += 1;
                parse_children(cursor, &mut element)?;
                return Ok(element);
            }
            Some(_) => {
                let attribute = parse_attribute(cursor)?;
                element.attributes.push(attribute);
            }
            None => return Err(format!("unterminated tag <{}>", element.name)),
        }
    }
}

fn parse_attribute(cursor: &mut Cursor) -> Result<(String, String), String> {
    let name = cursor.read_name()?;
    cursor.skip_whitespace();
    if cursor.bump() != Some('=') {
        return Err(format!("attribute '{}' missing '='", name));
    }
    cursor.skip_whitespace();
    let quote = match cursor.bump() {
        Some(ch @ ('"' | '\'')) => ch,
        _ => return Err(format!("attribute '{}' missing quoted value", name)),
    };
    let mut raw = String::new();
    loop {
        match cursor.bump() {
            Some(ch) if ch == quote => break,
            Some(ch) => raw.push(ch),
            None => return Err(format!("attribute '{}' has unterminated value", name)),
        }
    }
    Ok((name, unescape_entities(&raw)))
}

fn parse_children(cursor: &mut Cursor, parent: &mut XmlElement) -> Result<(), String> {
    loop {
        // Text content carries no data in any of the formats read here.
        while !cursor.at_end() && cursor.peek() != Some('<') {
            cursor.pos += 1;
        }
        if cursor.at_end() {
            return Err(format!("missing closing tag for <{}>", parent.name));
        }
        if cursor.starts_with("<!--") {
            cursor.skip_until("-->");
            continue;
        }
        if cursor.starts_with("<?") {
            cursor.skip_until("?>");
            continue;
        }
        if cursor.starts_with("</") {
            cursor.pos += 2;
            let name = cursor.read_name()?;
            if !name.eq_ignore_ascii_case(&parent.name) {
                return Err(format!(
                    "mismatched closing tag </{}> for <{}>",
                    name, parent.name
                ));
            }
            cursor.skip_whitespace();
            if cursor.bump() != Some('>') {
                return Err(format!("malformed closing tag </{}>", name));
            }
            return Ok(());
        }
        let child = parse_element(cursor)?;
        parent.children.push(child);
    }
}

fn unescape_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let Some(end) = rest.find(';') else {
            out.push_str(rest);
            return out;
        };
        let entity = &rest[1..end];
        match entity {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            _ => {
                let decoded = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| {
                        entity
                            .strip_prefix('#')
                            .and_then(|dec| dec.parse::<u32>().ok())
                    })
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => out.push(ch),
                    None => {
                        // Unknown entity, keep it verbatim.
                        out.push('&');
                        out.push_str(entity);
                        out.push(';');
                    }
                }
            }
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}
