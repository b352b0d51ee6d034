pub mod receipt_parser;
