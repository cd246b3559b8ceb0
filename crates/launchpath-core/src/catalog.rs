use crate::error::{Error, Result};
use crate::types::Plan;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Phase id validation
// ---------------------------------------------------------------------------

static PHASE_ID_RE: OnceLock<Regex> = OnceLock::new();

fn phase_id_re() -> &'static Regex {
    PHASE_ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_phase_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !phase_id_re().is_match(id) {
        return Err(Error::InvalidPhaseId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PhaseDefinition
// ---------------------------------------------------------------------------

/// One tool/phase in the guided journey. `depends_on` is a prerequisite *set*:
/// every listed phase must be completed before this one unlocks, in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseDefinition {
    pub id: String,
    pub title: String,
    pub required_plan: Plan,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

// ---------------------------------------------------------------------------
// PlanCatalog
// ---------------------------------------------------------------------------

/// Immutable lookup table of every phase, in presentation order.
///
/// Construction validates ids, rejects duplicates, and requires the
/// `depends_on` graph to be closed over registered ids and acyclic.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    phases: Vec<PhaseDefinition>,
    index: HashMap<String, usize>,
}

impl PlanCatalog {
    pub fn from_definitions(phases: Vec<PhaseDefinition>) -> Result<Self> {
        let mut index = HashMap::with_capacity(phases.len());
        for (i, phase) in phases.iter().enumerate() {
            validate_phase_id(&phase.id)?;
            if index.insert(phase.id.clone(), i).is_some() {
                return Err(Error::DuplicatePhase(phase.id.clone()));
            }
        }
        for phase in &phases {
            for dep in &phase.depends_on {
                if !index.contains_key(dep) {
                    return Err(Error::UnknownDependency {
                        phase: phase.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        let catalog = Self { phases, index };
        catalog.check_acyclic()?;
        Ok(catalog)
    }

    /// DFS with three-state coloring; a back edge means a cycle.
    fn check_acyclic(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            White,
            Gray,
            Black,
        }

        fn visit(catalog: &PlanCatalog, i: usize, marks: &mut [Mark]) -> Result<()> {
            marks[i] = Mark::Gray;
            for dep in &catalog.phases[i].depends_on {
                let j = catalog.index[dep];
                match marks[j] {
                    Mark::Gray => return Err(Error::DependencyCycle(dep.clone())),
                    Mark::White => visit(catalog, j, marks)?,
                    Mark::Black => {}
                }
            }
            marks[i] = Mark::Black;
            Ok(())
        }

        let mut marks = vec![Mark::White; self.phases.len()];
        for i in 0..self.phases.len() {
            if marks[i] == Mark::White {
                visit(self, i, &mut marks)?;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------------

    pub fn definition(&self, id: &str) -> Result<&PhaseDefinition> {
        self.index
            .get(id)
            .map(|&i| &self.phases[i])
            .ok_or_else(|| Error::UnknownPhase(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn phase_ids(&self) -> impl Iterator<Item = &str> {
        self.phases.iter().map(|p| p.id.as_str())
    }

    pub fn definitions(&self) -> &[PhaseDefinition] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let phases: Vec<PhaseDefinition> = serde_yaml::from_str(&data)?;
        Self::from_definitions(phases)
    }

    /// Load an operator-supplied catalog, falling back to the builtin table
    /// when no file exists at `path`.
    pub fn load_or_builtin(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::builtin())
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.phases)?)
    }

    // ---------------------------------------------------------------------------
    // Builtin catalog
    // ---------------------------------------------------------------------------

    /// The shipped journey: free entry phases, pro strategy tools, premium
    /// content generators, gold affiliate/agency surfaces.
    pub fn builtin() -> Self {
        fn def(id: &str, title: &str, required_plan: Plan, depends_on: &[&str]) -> PhaseDefinition {
            PhaseDefinition {
                id: id.to_string(),
                title: title.to_string(),
                required_plan,
                depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            }
        }

        let phases = vec![
            def("buyer-persona", "Buyer Persona Builder", Plan::Free, &[]),
            def("business-canvas", "Business Canvas", Plan::Free, &["buyer-persona"]),
            def(
                "content-strategy",
                "Content Strategy",
                Plan::Pro,
                &["buyer-persona", "business-canvas"],
            ),
            def("roadmap", "Roadmap", Plan::Pro, &["business-canvas"]),
            def(
                "content-generator",
                "Content Generator",
                Plan::Pro,
                &["content-strategy"],
            ),
            def(
                "ad-copy-studio",
                "Ad Copy Studio",
                Plan::Premium,
                &["content-strategy"],
            ),
            def(
                "email-sequences",
                "Email Sequences",
                Plan::Premium,
                &["content-strategy"],
            ),
            def("funnel-builder", "Funnel Builder", Plan::Premium, &["roadmap"]),
            def("affiliate-program", "Affiliate Program", Plan::Gold, &[]),
            def("agency", "Agency", Plan::Gold, &["content-strategy", "roadmap"]),
        ];
        // The builtin table is validated in tests; construction cannot fail.
        Self::from_definitions(phases).expect("builtin catalog is valid")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
