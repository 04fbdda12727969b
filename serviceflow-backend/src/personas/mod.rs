//! Agent persona configuration.
//!
//! Personas are pure data: a prompt string, a tool list, and routing
//! keywords. They are loaded from config/personas.ron when present, with
//! compiled-in defaults otherwise.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One agent persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPersona {
    pub name: String,
    pub description: String,
    /// System prompt handed to the model provider
    pub instructions: String,
    /// Canned acknowledgement returned by the pass-through endpoint
    pub greeting: String,
    #[serde(default)]
    pub tools: Vec<String>,
    /// Routing keywords; a persona with none is only reachable as default
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// RON file structure for config/personas.ron
#[derive(Debug, Deserialize)]
struct PersonaFile {
    default: String,
    personas: Vec<AgentPersona>,
}

pub struct PersonaRegistry {
    personas: Vec<AgentPersona>,
    default_name: String,
}

impl PersonaRegistry {
    /// Load personas from `<config_dir>/personas.ron`, falling back to the
    /// built-in set on a missing or unparseable file.
    pub fn load(config_dir: Option<&Path>) -> Self {
        if let Some(dir) = config_dir {
            let path = dir.join("personas.ron");
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(content) => match ron::from_str::<PersonaFile>(&content) {
                        Ok(file) => {
                            log::info!(
                                "Loaded {} personas from {:?}: {:?}",
                                file.personas.len(),
                                path,
                                file.personas.iter().map(|p| &p.name).collect::<Vec<_>>()
                            );
                            return Self::from_file(file);
                        }
                        Err(e) => log::error!("Failed to parse personas.ron: {}", e),
                    },
                    Err(e) => log::error!("Failed to read personas.ron: {}", e),
                }
            }
        }
        log::info!("Using built-in personas");
        Self::from_file(default_personas())
    }

    fn from_file(file: PersonaFile) -> Self {
        let mut registry = PersonaRegistry {
            personas: file.personas,
            default_name: file.default,
        };
        // A bad default name would make route() unable to fall back
        if !registry.personas.iter().any(|p| p.name == registry.default_name) {
            log::warn!(
                "Default persona '{}' not defined, using the first entry",
                registry.default_name
            );
            registry.default_name = registry
                .personas
                .first()
                .map(|p| p.name.clone())
                .unwrap_or_default();
        }
        registry
    }

    pub fn get(&self, name: &str) -> Option<&AgentPersona> {
        self.personas.iter().find(|p| p.name == name)
    }

    pub fn list(&self) -> &[AgentPersona] {
        &self.personas
    }

    pub fn default_persona(&self) -> &AgentPersona {
        self.get(&self.default_name)
            .expect("default persona must exist")
    }

    /// Keyword-match router: the first persona with a keyword contained in
    /// the lowercased message wins; no match falls back to the default.
    pub fn route(&self, message: &str) -> &AgentPersona {
        let text = message.to_lowercase();
        self.personas
            .iter()
            .find(|p| p.keywords.iter().any(|k| text.contains(k.as_str())))
            .unwrap_or_else(|| self.default_persona())
    }
}

fn default_personas() -> PersonaFile {
    PersonaFile {
        default: "concierge".to_string(),
        personas: vec![
            AgentPersona {
                name: "token-gate".to_string(),
                description: "Verifies NFT-gated admin and holder status".to_string(),
                instructions: "You verify wallet ownership of ServiceFlow access tokens. \
                               Report admin status, holder status, and owned token IDs. \
                               Never speculate about ownership you have not checked on-chain."
                    .to_string(),
                greeting: "Checking your wallet against the ServiceFlow access collection."
                    .to_string(),
                tools: vec!["verify_ownership".to_string()],
                keywords: vec![
                    "verify".to_string(),
                    "admin".to_string(),
                    "holder".to_string(),
                    "nft".to_string(),
                    "token".to_string(),
                    "wallet".to_string(),
                ],
            },
            AgentPersona {
                name: "publisher".to_string(),
                description: "Drafts and posts service-business content".to_string(),
                instructions: "You draft short announcements and updates for service \
                               businesses and publish them through the content webhook."
                    .to_string(),
                greeting: "I can draft and publish an announcement for you.".to_string(),
                tools: vec!["post_content".to_string()],
                keywords: vec![
                    "post".to_string(),
                    "publish".to_string(),
                    "announce".to_string(),
                    "content".to_string(),
                ],
            },
            AgentPersona {
                name: "billing".to_string(),
                description: "Answers subscription and credit questions".to_string(),
                instructions: "You answer questions about ServiceFlow subscription tiers, \
                               credits, and upgrades. Tiers are free, starter, pro, and \
                               enterprise."
                    .to_string(),
                greeting: "Happy to help with plans and credits.".to_string(),
                tools: vec![],
                keywords: vec![
                    "price".to_string(),
                    "plan".to_string(),
                    "subscription".to_string(),
                    "billing".to_string(),
                    "credit".to_string(),
                    "upgrade".to_string(),
                ],
            },
            AgentPersona {
                name: "concierge".to_string(),
                description: "General assistant for service businesses".to_string(),
                instructions: "You are the ServiceFlow concierge. Help owners of service \
                               businesses automate scheduling, leads, and customer follow-up."
                    .to_string(),
                greeting: "Welcome to ServiceFlow. What can I set up for your business?"
                    .to_string(),
                tools: vec![],
                keywords: vec![],
            },
        ],
    }
}
