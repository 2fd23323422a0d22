//! Specialty normalization and fuzzy matching.
//!
//! The analysis step hands back free text ("Cardiologist", "ENT
//! specialist", ...) and the geodata side tags facilities with equally
//! free text. A `SpecialtyQuery` bridges the two: the requested specialty
//! is normalized, expanded into a synonym set when recognized, and matched
//! against candidate text by case-insensitive substring.

// ── Synonym table ────────────────────────────────────────────────

/// Specialty keys with the alternate terms that identify them in
/// facility names, tags, and descriptions.
const SPECIALTY_SYNONYMS: &[(&str, &[&str])] = &[
    ("cardiologist", &["cardiology", "heart", "cardiac"]),
    ("dermatologist", &["dermatology", "skin"]),
    ("neurologist", &["neurology", "brain", "nerve"]),
    ("orthopedist", &["orthopedic", "orthopaedic", "bone", "joint"]),
    ("pediatrician", &["pediatric", "paediatric", "child", "children"]),
    (
        "gynecologist",
        &["gynecology", "gynaecology", "obstetric", "maternity"],
    ),
    ("psychiatrist", &["psychiatry", "mental", "psychology"]),
    ("dentist", &["dental", "tooth", "teeth"]),
    ("ophthalmologist", &["ophthalmology", "eye", "optical"]),
    (
        "ent specialist",
        &["otolaryngology", "ent", "ear", "nose", "throat"],
    ),
    ("urologist", &["urology", "kidney", "urinary"]),
    (
        "gastroenterologist",
        &["gastroenterology", "gastric", "digestive", "stomach"],
    ),
    ("general physician", &["general", "family", "physician", "gp"]),
];

/// Synthetic facility names, keyed by specialty. Falls back to the
/// generic table for anything unrecognized or untabled.
const SYNTHETIC_NAMES: &[(&str, [&str; 5])] = &[
    (
        "cardiologist",
        [
            "HeartCare Institute",
            "Pulse Cardiac Centre",
            "CityBeat Heart Clinic",
            "Aortic Care Hospital",
            "CardioWell Speciality Clinic",
        ],
    ),
    (
        "dermatologist",
        [
            "ClearSkin Dermatology Clinic",
            "DermaCare Centre",
            "SkinFirst Speciality Clinic",
            "Radiance Skin Institute",
            "EpiDerm Care Hospital",
        ],
    ),
    (
        "dentist",
        [
            "BrightSmile Dental Studio",
            "Pearl Dental Care",
            "City Orthodontic Centre",
            "Molar & More Dental Clinic",
            "Apex Dental Hospital",
        ],
    ),
    (
        "pediatrician",
        [
            "Little Steps Children's Clinic",
            "Sunshine Pediatric Centre",
            "KidsFirst Care Hospital",
            "Sprout Child Health Clinic",
            "Rainbow Children's Hospital",
        ],
    ),
    (
        "orthopedist",
        [
            "MotionWorks Ortho Clinic",
            "JointCare Orthopedic Centre",
            "SpineAlign Institute",
            "FlexBone Speciality Clinic",
            "Stride Orthopedic Hospital",
        ],
    ),
];

const GENERIC_NAMES: [&str; 5] = [
    "CityCare Multispeciality Hospital",
    "LifePoint Medical Centre",
    "Sunrise Community Clinic",
    "Greenview General Hospital",
    "Wellness First Health Centre",
];

// ── Query ────────────────────────────────────────────────────────

/// A normalized specialty plus its synonym set, built per search and
/// never stored.
#[derive(Debug, Clone)]
pub struct SpecialtyQuery {
    normalized: String,
    synonyms: &'static [&'static str],
    recognized: bool,
}

impl SpecialtyQuery {
    /// Normalize raw specialty text and expand it against the synonym
    /// table. Unrecognized specialties still match by their own text.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();

        let entry = SPECIALTY_SYNONYMS.iter().find(|(key, synonyms)| {
            *key == normalized || synonyms.iter().any(|s| normalized.contains(s))
        });

        match entry {
            Some((_, synonyms)) => Self {
                normalized,
                synonyms,
                recognized: true,
            },
            None => Self {
                normalized,
                synonyms: &[],
                recognized: false,
            },
        }
    }

    /// Whether the specialty mapped onto a known category.
    pub fn is_recognized(&self) -> bool {
        self.recognized
    }

    /// The normalized form of the raw request.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Case-insensitive substring match against a candidate's free text.
    /// An empty query matches nothing.
    pub fn matches(&self, haystack: &str) -> bool {
        if self.normalized.is_empty() {
            return false;
        }
        let haystack = haystack.to_lowercase();
        if haystack.contains(&self.normalized) {
            return true;
        }
        self.synonyms.iter().any(|s| haystack.contains(s))
    }

    /// Names for synthetic candidates, drawn from the specialty-keyed
    /// table when one exists.
    pub fn synthetic_names(&self) -> [&'static str; 5] {
        SYNTHETIC_NAMES
            .iter()
            .find(|(key, _)| {
                self.recognized && (*key == self.normalized || self.normalized.contains(key))
            })
            .map(|(_, names)| *names)
            .unwrap_or(GENERIC_NAMES)
    }
}

// ── Tests ──────────────────────────────────────────────────────────
