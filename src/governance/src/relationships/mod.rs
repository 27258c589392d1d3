//! Role relationship analysis
//!
//! Answers, for one identity, which assigned roles justify which detected
//! roles, which roles each assigned role requires, and which of those
//! requirements the identity is missing.
//!
//! # Example
//!
//! ```rust
//! use rolegraph_core::{RoleDefinition, RoleGraphBuilder, RoleId, TraversalLimits};
//! use rolegraph_governance::relationships::RelationshipAnalyzer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = RoleGraphBuilder::new();
//! builder.add_role(RoleDefinition::new("employee", "Employee").requires("badge"))?;
//! builder.add_role(RoleDefinition::new("badge", "Badge Access"))?;
//! builder.add_role(RoleDefinition::new("manager", "Manager").inherits("employee"))?;
//! let graph = builder.build()?;
//!
//! let analyzer = RelationshipAnalyzer::new(&graph, TraversalLimits::default());
//! let relationships = analyzer.analyze(&[RoleId::from("manager")], &[RoleId::from("badge")])?;
//!
//! let manager = graph.lookup(&RoleId::from("manager")).unwrap();
//! assert!(relationships.missing_requirements(manager)?.is_empty());
//! # Ok(())
//! # }
//! ```

mod analyzer;
mod result;


pub use analyzer::RelationshipAnalyzer;
pub use result::{RelationshipSummary, RoleRelationships};
