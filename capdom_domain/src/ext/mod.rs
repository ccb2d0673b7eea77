pub mod bigdecimal;
