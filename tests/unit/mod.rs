mod cache;
mod roadmap_flow;
mod validation;
mod webhook;
