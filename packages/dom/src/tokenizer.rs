/// Tokens produced by the HTML scanner
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Raw content between `<!` and `>`
    Doctype(String),
    Comment(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Text(String),
}

/// Elements whose content is scanned as raw text up to the matching end tag
pub(crate) fn is_raw_text_element(name: &str) -> bool {
    matches!(name, "script" | "style" | "textarea" | "title")
}

pub fn tokenize(source: &str) -> Vec<Token> {
    Tokenizer::new(source).run()
}

/// Hand-written scanner. HTML tokenization is context-sensitive (raw-text
/// modes, unquoted attribute values), so this is a state machine over the
/// byte stream rather than a generated lexer. All slicing happens at ASCII
/// structural characters, keeping UTF-8 boundaries intact.
struct Tokenizer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'src> Tokenizer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        let mut text_start = 0;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] != b'<' {
                self.pos += 1;
                continue;
            }
            let rest = &self.bytes[self.pos + 1..];
            if rest.starts_with(b"!--") {
                self.flush_text(text_start);
                self.consume_comment();
                text_start = self.pos;
            } else if rest.first() == Some(&b'!') {
                self.flush_text(text_start);
                self.consume_doctype();
                text_start = self.pos;
            } else if rest.first() == Some(&b'/')
                && rest.get(1).is_some_and(|b| b.is_ascii_alphabetic())
            {
                self.flush_text(text_start);
                self.consume_end_tag();
                text_start = self.pos;
            } else if rest.first().is_some_and(|b| b.is_ascii_alphabetic()) {
                self.flush_text(text_start);
                if !self.consume_start_tag() {
                    // Unterminated tag: the rest of the input is text
                    self.tokens.push(Token::Text(self.source[self.pos..].to_string()));
                    self.pos = self.bytes.len();
                }
                text_start = self.pos;
            } else {
                // A literal '<' in text content
                self.pos += 1;
            }
        }
        self.flush_text(text_start);
        self.tokens
    }

    fn flush_text(&mut self, start: usize) {
        if start < self.pos {
            self.tokens
                .push(Token::Text(self.source[start..self.pos].to_string()));
        }
    }

    fn consume_comment(&mut self) {
        let content_start = self.pos + 4; // past "<!--"
        match find(self.bytes, content_start, b"-->") {
            Some(end) => {
                self.tokens
                    .push(Token::Comment(self.source[content_start..end].to_string()));
                self.pos = end + 3;
            }
            None => {
                self.tokens
                    .push(Token::Comment(self.source[content_start..].to_string()));
                self.pos = self.bytes.len();
            }
        }
    }

    fn consume_doctype(&mut self) {
        let content_start = self.pos + 2; // past "<!"
        match find(self.bytes, content_start, b">") {
            Some(end) => {
                self.tokens
                    .push(Token::Doctype(self.source[content_start..end].to_string()));
                self.pos = end + 1;
            }
            None => {
                self.tokens
                    .push(Token::Doctype(self.source[content_start..].to_string()));
                self.pos = self.bytes.len();
            }
        }
    }

    fn consume_end_tag(&mut self) {
        let name_start = self.pos + 2; // past "</"
        let mut p = name_start;
        while p < self.bytes.len() && is_tag_name_byte(self.bytes[p]) {
            p += 1;
        }
        let name = self.source[name_start..p].to_ascii_lowercase();
        match find(self.bytes, p, b">") {
            Some(end) => self.pos = end + 1,
            None => self.pos = self.bytes.len(),
        }
        self.tokens.push(Token::EndTag { name });
    }

    /// Returns false when the tag never closes (caller treats the rest as text)
    fn consume_start_tag(&mut self) -> bool {
        let len = self.bytes.len();
        let name_start = self.pos + 1;
        let mut p = name_start;
        while p < len && is_tag_name_byte(self.bytes[p]) {
            p += 1;
        }
        let name = self.source[name_start..p].to_ascii_lowercase();

        let mut attributes: Vec<(String, Option<String>)> = Vec::new();
        let mut self_closing = false;
        loop {
            while p < len && self.bytes[p].is_ascii_whitespace() {
                p += 1;
            }
            if p >= len {
                return false;
            }
            match self.bytes[p] {
                b'>' => {
                    p += 1;
                    break;
                }
                b'/' => {
                    if self.bytes.get(p + 1) == Some(&b'>') {
                        self_closing = true;
                        p += 2;
                        break;
                    }
                    p += 1;
                }
                _ => {
                    let attr_start = p;
                    while p < len
                        && !self.bytes[p].is_ascii_whitespace()
                        && !matches!(self.bytes[p], b'=' | b'>' | b'/')
                    {
                        p += 1;
                    }
                    let attr_name = self.source[attr_start..p].to_ascii_lowercase();
                    while p < len && self.bytes[p].is_ascii_whitespace() {
                        p += 1;
                    }
                    if self.bytes.get(p) == Some(&b'=') {
                        p += 1;
                        while p < len && self.bytes[p].is_ascii_whitespace() {
                            p += 1;
                        }
                        let value = match self.bytes.get(p) {
                            Some(&quote @ (b'"' | b'\'')) => {
                                p += 1;
                                let value_start = p;
                                while p < len && self.bytes[p] != quote {
                                    p += 1;
                                }
                                let value = self.source[value_start..p].to_string();
                                if p < len {
                                    p += 1; // closing quote
                                }
                                value
                            }
                            _ => {
                                let value_start = p;
                                while p < len
                                    && !self.bytes[p].is_ascii_whitespace()
                                    && self.bytes[p] != b'>'
                                {
                                    p += 1;
                                }
                                self.source[value_start..p].to_string()
                            }
                        };
                        if !attr_name.is_empty() {
                            attributes.push((attr_name, Some(value)));
                        }
                    } else if !attr_name.is_empty() {
                        attributes.push((attr_name, None));
                    } else {
                        p += 1;
                    }
                }
            }
        }

        self.pos = p;
        let raw = !self_closing && is_raw_text_element(&name);
        self.tokens.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });
        if raw {
            self.consume_raw_text(&name);
        }
        true
    }

    /// Everything up to `</name` is one text token, verbatim
    fn consume_raw_text(&mut self, name: &str) {
        let needle = format!("</{}", name);
        match find_ignore_case(self.bytes, self.pos, needle.as_bytes()) {
            Some(end) => {
                if end > self.pos {
                    self.tokens
                        .push(Token::Text(self.source[self.pos..end].to_string()));
                }
                match find(self.bytes, end, b">") {
                    Some(gt) => self.pos = gt + 1,
                    None => self.pos = self.bytes.len(),
                }
                self.tokens.push(Token::EndTag {
                    name: name.to_string(),
                });
            }
            None => {
                if self.pos < self.bytes.len() {
                    self.tokens
                        .push(Token::Text(self.source[self.pos..].to_string()));
                }
                self.pos = self.bytes.len();
            }
        }
    }
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_' | b'.')
}

fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_ignore_case(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|offset| from + offset)
}
