//! Shared type definitions for dispute templates, their data mappings, and
//! the context those mappings populate.

pub mod context;
pub mod dispute;
pub mod draft;
pub mod mapping;
pub mod template;

pub use context::DataContext;
pub use dispute::{Answer, Attachment, DisputeDetails, QuestionType, REFUSE_TO_ARBITRATE_TITLE, ValidationError, is_address, parse_ruling_id};
pub use draft::{AliasEntry, ArbitrationDeployment, DisputeTemplateDraft};
pub use mapping::{
    AbiCallMapping, AbiEventMapping, DataMapping, EventFilter, FetchIpfsJsonMapping, FetchJsonMapping, JsonMapping, MappingKind, ResultSpec,
    SubgraphMapping,
};
pub use template::{ArbitrableRef, DisputeTemplateRecord, IndexedDispute};
