mod bootstrap;
mod signing;
