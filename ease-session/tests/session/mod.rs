mod documents;
mod drafts;
mod images;
mod views;
