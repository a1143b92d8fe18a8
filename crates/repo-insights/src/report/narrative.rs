use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bullet {
    pub text: String,
    pub depth: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

impl Bullet {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            depth: 0,
            link: None,
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new("").linked(label, url)
    }

    pub fn nested(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    pub fn linked(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.link = Some(Link {
            label: label.into(),
            url: url.into(),
        });
        self
    }
}

/// Static commentary surrounding a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        link: Option<String>,
    },
    Paragraph {
        text: String,
    },
    Bullets {
        items: Vec<Bullet>,
    },
    KeyFinding {
        text: String,
    },
    Footnote {
        text: String,
    },
    Image {
        source: String,
        alt: String,
    },
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
            link: None,
        }
    }

    pub fn linked_heading(level: u8, text: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
            link: Some(url.into()),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into() }
    }

    pub fn bullets(items: Vec<Bullet>) -> Self {
        Self::Bullets { items }
    }

    pub fn finding(text: impl Into<String>) -> Self {
        Self::KeyFinding { text: text.into() }
    }

    pub fn footnote(text: impl Into<String>) -> Self {
        Self::Footnote { text: text.into() }
    }

    pub fn image(source: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::Image {
            source: source.into(),
            alt: alt.into(),
        }
    }

    pub fn heading_text(&self) -> Option<&str> {
        match self {
            Self::Heading { text, .. } => Some(text),
            _ => None,
        }
    }
}
