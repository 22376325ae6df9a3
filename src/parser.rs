mod loader;
mod nom_parser;
mod yaml_parser;

pub use self::{
    loader::load,
    nom_parser::{
        parse, parse_file, BlackboardValue, PortDef, PortMap, TreeDef, TreeRootDef, TreeSource,
        VarDef,
    },
    yaml_parser::load_yaml,
};
