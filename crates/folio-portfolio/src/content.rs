#![forbid(unsafe_code)]

//! Content provider: the read-only records the panels display.
//!
//! [`Content::builtin`] carries the default portfolio. A JSON file with the
//! same shape can replace it via [`Content::load_json`]; every collection in
//! the file is optional and falls back to the built-in one.

use std::fmt;
use std::io;
use std::path::Path;

use folio_render::cell::PackedRgba;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// `#rrggbb`.
    pub color: String,
    #[serde(default, rename = "image")]
    pub image_ref: String,
    #[serde(rename = "liveUrl")]
    pub live_url: String,
    #[serde(rename = "codeUrl")]
    pub code_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    /// Percentage, 0 to 100.
    pub level: u8,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub year: String,
    pub title: String,
    pub company: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub name: String,
    pub role: String,
    pub company: String,
    pub quote: String,
    #[serde(default, rename = "avatar")]
    pub avatar_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Content {
    pub projects: Vec<Project>,
    pub skills: Vec<Skill>,
    pub experience: Vec<Experience>,
    pub testimonials: Vec<Testimonial>,
}

impl Default for Content {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug)]
pub enum ContentError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentError::Io(e) => write!(f, "cannot read content file: {e}"),
            ContentError::Parse(e) => write!(f, "invalid content file: {e}"),
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContentError::Io(e) => Some(e),
            ContentError::Parse(e) => Some(e),
        }
    }
}

impl From<io::Error> for ContentError {
    fn from(e: io::Error) -> Self {
        ContentError::Io(e)
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(e: serde_json::Error) -> Self {
        ContentError::Parse(e)
    }
}

/// Parse a `#rrggbb` record colour, falling back to `fallback`.
pub fn record_color(hex: &str, fallback: PackedRgba) -> PackedRgba {
    PackedRgba::from_hex(hex).unwrap_or(fallback)
}

impl Content {
    pub fn load_json(path: &Path) -> Result<Self, ContentError> {
        let text = std::fs::read_to_string(path)?;
        let content = Self::from_json(&text)?;
        tracing::info!(
            target: "folio.content",
            path = %path.display(),
            projects = content.projects.len(),
            skills = content.skills.len(),
            "content loaded"
        );
        Ok(content)
    }

    pub fn from_json(text: &str) -> Result<Self, ContentError> {
        let mut content: Content = serde_json::from_str(text)?;
        for skill in &mut content.skills {
            skill.level = skill.level.min(100);
        }
        Ok(content)
    }

    pub fn builtin() -> Self {
        let placeholder = "/placeholder.svg?height=300&width=500";
        let avatar = "/placeholder.svg?height=80&width=80";
        let project = |id, title: &str, description: &str, tags: [&str; 3], color: &str| Project {
            id,
            title: title.to_owned(),
            description: description.to_owned(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            color: color.to_owned(),
            image_ref: placeholder.to_owned(),
            live_url: "https://example.com".to_owned(),
            code_url: "https://github.com/example".to_owned(),
        };
        let skill = |name: &str, level, color: &str| Skill {
            name: name.to_owned(),
            level,
            color: color.to_owned(),
        };
        let experience = |year: &str, title: &str, company: &str, description: &str| Experience {
            year: year.to_owned(),
            title: title.to_owned(),
            company: company.to_owned(),
            description: description.to_owned(),
        };
        let testimonial = |name: &str, role: &str, company: &str, quote: &str| Testimonial {
            name: name.to_owned(),
            role: role.to_owned(),
            company: company.to_owned(),
            quote: quote.to_owned(),
            avatar_ref: avatar.to_owned(),
        };

        Self {
            projects: vec![
                project(
                    1,
                    "Neuomorphic Dashboard",
                    "A unique admin interface with depth and tactility. This dashboard provides an intuitive way to visualize complex data with a modern design approach that emphasizes shadows and subtle gradients to create a sense of physical depth.",
                    ["React", "Tailwind CSS", "Framer Motion"],
                    "#2dd4bf",
                ),
                project(
                    2,
                    "Immersive Learning Platform",
                    "Educational platform with interactive 3D elements that transform traditional learning into an engaging experience. Students can manipulate virtual objects, explore complex concepts through spatial visualization, and track their progress through gamified elements.",
                    ["Next.js", "Three.js", "TypeScript"],
                    "#8b5cf6",
                ),
                project(
                    3,
                    "Ambient Music Generator",
                    "AI-powered tool for creating atmospheric soundscapes based on mood, environment, and user preferences. The application uses machine learning to analyze patterns in ambient music and generates unique compositions that adapt to the user's input parameters.",
                    ["TensorFlow.js", "Web Audio API", "React"],
                    "#f43f5e",
                ),
                project(
                    4,
                    "Generative Art Engine",
                    "Algorithm-based tool for creating unique visual patterns that can be customized through various parameters. Users can adjust complexity, color schemes, and animation properties to generate artwork that can be exported as high-resolution images or animations.",
                    ["Canvas API", "p5.js", "Node.js"],
                    "#f97316",
                ),
            ],
            skills: vec![
                skill("Frontend Development", 90, "#06b6d4"),
                skill("UI/UX Design", 85, "#8b5cf6"),
                skill("Backend Development", 75, "#22c55e"),
                skill("Creative Coding", 80, "#f97316"),
                skill("3D Visualization", 70, "#f43f5e"),
            ],
            experience: vec![
                experience(
                    "2023",
                    "Senior Frontend Developer",
                    "Tech Innovations Inc.",
                    "Led development of interactive web applications, mentored junior developers, and implemented modern frontend architecture using React and TypeScript.",
                ),
                experience(
                    "2021",
                    "Frontend Developer",
                    "Creative Digital Agency",
                    "Built responsive websites and interactive experiences for major clients across various industries using modern JavaScript frameworks and animation libraries.",
                ),
                experience(
                    "2019",
                    "Junior Web Developer",
                    "StartUp Ventures",
                    "Contributed to building the company's flagship product, focusing on UI components and responsive design implementation.",
                ),
            ],
            testimonials: vec![
                testimonial(
                    "Sarah Johnson",
                    "Marketing Director",
                    "Brand Co",
                    "Working with this developer was a game-changer for our company. The attention to detail and creative solutions exceeded our expectations.",
                ),
                testimonial(
                    "Michael Chen",
                    "Startup Founder",
                    "TechLaunch",
                    "Incredibly responsive and professional. Delivered our project on time and with features we hadn't even thought of. Highly recommended!",
                ),
                testimonial(
                    "Emma Rodriguez",
                    "Product Manager",
                    "SaaS Platform",
                    "The developer's ability to translate our complex requirements into an intuitive interface was impressive. Our users love the result.",
                ),
                testimonial(
                    "David Kim",
                    "Creative Director",
                    "Design Studio",
                    "Rare to find a developer with both technical expertise and an eye for design. The collaborative process was smooth and the outcome was exceptional.",
                ),
            ],
        }
    }
}
