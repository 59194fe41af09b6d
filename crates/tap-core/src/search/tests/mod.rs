mod output;
mod properties;
