mod compiler;
mod types;

pub use compiler::{
    compile_content, compile_content_documents, ContentCompileError, ContentErrorCode,
    SourceLocation,
};
pub use types::{
    ChoiceDef, ContentDatabase, CounterDef, GateDef, LayoutDefs, MapDef, NpcDef, PlayerDef,
    ProductDef, ShopDef, StoryDefs, StorySceneDef, ZoneDef,
};
