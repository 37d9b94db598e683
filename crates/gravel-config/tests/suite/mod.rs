mod discovery;
mod loading;
mod schema;
