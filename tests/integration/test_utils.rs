//! Shared parser fixtures for integration tests

use argconf::{ArgSpec, ConfigParser, TypeTag, Value};

/// Parser with settings in DEFAULT and two named groups, mixing positionals,
/// typed flags, short aliases and destination overrides.
pub fn full_parser() -> ConfigParser {
    let mut parser = ConfigParser::new();

    parser
        .add_argument(ArgSpec::new(["positional_arg"]).default(Value::Null))
        .unwrap();
    parser
        .add_argument(ArgSpec::new(["--optional_arg1"]).default(1).value_type(TypeTag::Int))
        .unwrap();
    parser
        .add_argument(
            ArgSpec::new(["--optional_arg2", "-oa2"])
                .default(1)
                .value_type(TypeTag::Int),
        )
        .unwrap();
    parser
        .add_argument(
            ArgSpec::new(["--optional_arg3"])
                .dest("arg3")
                .default(1.0)
                .value_type(TypeTag::Float),
        )
        .unwrap();

    let mut group = parser.add_argument_group("GROUP1", None).unwrap();
    group
        .add_argument(ArgSpec::new(["--optional_group1"]).default(1).value_type(TypeTag::Int))
        .unwrap();
    group
        .add_argument(ArgSpec::new(["positional_group1"]).default(1))
        .unwrap();

    let mut group = parser.add_argument_group("GROUP2", None).unwrap();
    group
        .add_argument(ArgSpec::new(["--optional_group2"]).default(1).value_type(TypeTag::Int))
        .unwrap();
    group
        .add_argument(ArgSpec::new(["positional_group2"]).default(Value::Null))
        .unwrap();

    parser
}

/// Command line setting every positional and most flags of [`full_parser`].
pub fn full_argv() -> Vec<&'static str> {
    vec![
        "app",
        "--optional_arg1",
        "0",
        "--optional_arg2",
        "0",
        "--optional_arg3",
        "0",
        "--optional_group2",
        "0",
        "positional",
        "1",
        "some",
    ]
}
