mod logger;
mod startup;
